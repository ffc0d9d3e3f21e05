//! Backend abstractions for the motion sampler.
//!
//! The platform accelerometer is an external collaborator; this module
//! defines the trait each concrete sampler implements plus the start
//! context that wires it to the engine's sample channel without coupling
//! it to higher-level code.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::TrackerError;

/// One timestamped 3-axis acceleration reading, in units of g.
///
/// Only the y-axis participates in step detection; x and z are carried for
/// metrics and replay fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Timestamp in milliseconds. Monotonically non-decreasing within a
    /// session; the clock origin is the backend's concern.
    pub timestamp_ms: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    pub fn new(timestamp_ms: u64, x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp_ms,
            x,
            y,
            z,
        }
    }
}

/// Context provided to motion backends when starting a tracking session.
pub struct SensorStartContext {
    /// Bounded channel into the engine's sample worker. Backends must not
    /// block their sampling thread on a full channel; excess samples are
    /// dropped (delivery semantics belong to the platform sampler).
    pub sample_tx: mpsc::Sender<AccelSample>,
}

/// Trait implemented by platform-specific motion samplers.
///
/// `start` subscribes exactly once and `stop` releases the subscription;
/// the engine guarantees `stop` is reached on every teardown path so
/// callbacks never fire against torn-down state.
pub trait MotionBackend: Send + Sync {
    /// Whether the motion capability exists on the running device.
    fn is_available(&self) -> bool;
    fn start(&self, ctx: SensorStartContext) -> Result<(), TrackerError>;
    fn stop(&self) -> Result<(), TrackerError>;
}

/// Trait representing a monotonic time source used for telemetry timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by `Instant::now`.
#[derive(Default)]
pub struct SystemTimeSource {
    _unit: (),
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

mod replay;
mod simulated;
mod stub;

pub use replay::ReplayBackend;
pub use simulated::{SimulatedWalkBackend, WalkProfile};
pub use stub::{StubTimeSource, UnavailableBackend};
