// Tracking session error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Tracker error code constants
///
/// These constants provide a single source of truth for error codes shared
/// with the presentation layer and the diagnostics surfaces.
///
/// Error code range: 1101-1105
pub struct TrackerErrorCodes {}

impl TrackerErrorCodes {
    /// Motion sensor capability is absent on this device
    pub const SENSOR_UNAVAILABLE: i32 = 1101;

    /// Tracking session is already running
    pub const ALREADY_TRACKING: i32 = 1102;

    /// Tracking session is not running
    pub const NOT_TRACKING: i32 = 1103;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 1104;

    /// Sample channel disconnected or closed unexpectedly
    pub const STREAM_FAILURE: i32 = 1105;
}

/// Log a tracker error with structured context
///
/// Fields carried on every line:
/// - error_code: numeric code for programmatic handling
/// - component: the component where the error occurred
/// - message: human-readable error message
pub fn log_tracker_error(err: &TrackerError, context: &str) {
    error!(
        "Tracker error in {}: code={}, component=TrackerHandle, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Tracking session errors
///
/// These errors cover the sensor subscription lifecycle and access to the
/// shared session state.
///
/// Error code range: 1101-1105
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Motion sensor capability is absent on this device
    SensorUnavailable,

    /// Tracking session is already running
    AlreadyTracking,

    /// Tracking session is not running
    NotTracking,

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// Sample channel disconnected unexpectedly
    StreamFailure { reason: String },
}

impl ErrorCode for TrackerError {
    fn code(&self) -> i32 {
        match self {
            TrackerError::SensorUnavailable => TrackerErrorCodes::SENSOR_UNAVAILABLE,
            TrackerError::AlreadyTracking => TrackerErrorCodes::ALREADY_TRACKING,
            TrackerError::NotTracking => TrackerErrorCodes::NOT_TRACKING,
            TrackerError::LockPoisoned { .. } => TrackerErrorCodes::LOCK_POISONED,
            TrackerError::StreamFailure { .. } => TrackerErrorCodes::STREAM_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            TrackerError::SensorUnavailable => {
                "Accelerometer not available on this device.".to_string()
            }
            TrackerError::AlreadyTracking => {
                "Tracking session already running. Call stop_tracking() first.".to_string()
            }
            TrackerError::NotTracking => {
                "Tracking session not running. Call start_tracking() first.".to_string()
            }
            TrackerError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            TrackerError::StreamFailure { reason } => {
                format!("Sample stream failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrackerError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TrackerError {}
