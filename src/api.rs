// Public API for presentation-layer integration
//
// This module is the single surface the UI shell consumes: lifecycle
// functions, the user-invocable reset action, the current observable
// snapshot, and async streams of state changes.

use once_cell::sync::Lazy;

use crate::engine::TrackerHandle;
use crate::error::TrackerError;

mod types;
pub use types::{MotionMetrics, TrackerSnapshot};

pub mod streams;

// Re-export error code constants for presentation-layer exposure
pub use crate::error::TrackerErrorCodes;

/// Global TrackerHandle instance - single dependency injection container
///
/// Consolidates all application state (motion backend, counters, broadcast
/// channels) into one context with clear ownership and lifecycle, instead
/// of mutable state scattered across the component tree.
pub(crate) static TRACKER_HANDLE: Lazy<TrackerHandle> = Lazy::new(TrackerHandle::new);

/// Get the version of the tracker core
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Whether the motion sensor capability exists on this device
///
/// Purely informational; `start_tracking` performs its own availability
/// check and degrades gracefully when the sensor is absent.
pub fn is_sensor_available() -> bool {
    TRACKER_HANDLE.is_sensor_available()
}

/// Start a tracking session
///
/// Checks sensor availability, subscribes to the motion sampler once, and
/// spawns the sample worker. When the sensor is unavailable the session
/// still starts successfully: the condition is logged, a telemetry event is
/// emitted, and the count simply stays at zero.
///
/// # Errors
/// - Tracking session already running (call stop_tracking first)
/// - Lock poisoning on shared state
/// - Backend subscription failure
pub fn start_tracking() -> Result<(), TrackerError> {
    TRACKER_HANDLE.start_tracking()
}

/// Stop the tracking session
///
/// Releases the sensor subscription, cancels any pending cooldown timer,
/// and shuts the sample worker down. The step count survives the stop; only
/// an explicit reset clears it.
///
/// # Errors
/// - Tracking session not running
/// - Lock poisoning on shared state
pub fn stop_tracking() -> Result<(), TrackerError> {
    TRACKER_HANDLE.stop_tracking()
}

/// Reset the step count to zero
///
/// The user-invocable reset action. Unconditional: succeeds regardless of
/// the prior count or whether a session is running, and the derived calorie
/// estimate recomputes to 0.00 immediately. Returns the fresh snapshot.
pub fn reset_steps() -> Result<TrackerSnapshot, TrackerError> {
    TRACKER_HANDLE.reset_steps()
}

/// Current observable state
///
/// Steps, two-decimal calorie display value, and the cooling-down flag used
/// to pick between the walking and sitting animation states.
pub fn tracker_snapshot() -> Result<TrackerSnapshot, TrackerError> {
    TRACKER_HANDLE.snapshot()
}
