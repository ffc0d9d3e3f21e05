// Detection module - step detection and counting
//
// This module holds the decision logic of the tracker: a pure transition
// function that turns a noisy y-axis acceleration signal into discrete step
// events, and the counter that accumulates them into the observable totals.
//
// Architecture:
// - StepDetector: threshold-and-cooldown rule over an explicit DetectorState
// - StepCounter: running total plus derived calorie figure
// - Output: StepEvent published via tokio broadcast to the presentation layer

pub mod counter;
pub mod detector;

pub use counter::StepCounter;
pub use detector::{DetectorPhase, DetectorState, StepDetector, Transition};

/// A single accepted step
///
/// Sent to the presentation layer whenever the detector accepts a threshold
/// crossing, carrying enough context to render or debug the detection.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepEvent {
    /// Sample timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Absolute y-axis deviation (in g) that triggered the detection
    pub delta_y: f64,
    /// Running step count after this step was credited (1-based)
    pub step_index: u64,
}
