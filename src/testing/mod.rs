//! Deterministic test support shared by unit tests, integration tests,
//! and the diagnostics CLI.

pub mod fixtures;
