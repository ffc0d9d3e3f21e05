//! Tracking engine: session orchestration shared across the API surface,
//! the diagnostics CLI, and the optional debug HTTP server.

pub mod core;

pub use core::{TelemetryEvent, TelemetryEventKind, TrackerHandle};
