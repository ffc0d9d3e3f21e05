// Error types for the step tracker core
//
// This module defines custom error types for tracking session operations,
// providing structured error handling with stable numeric codes suitable
// for presentation-layer and diagnostics surfaces.

mod tracker;

pub use tracker::{log_tracker_error, TrackerError, TrackerErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// process boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
