// StepDetector - threshold-and-cooldown step detection
//
// Decides, from a continuous noisy acceleration signal, when a discrete step
// occurred, while suppressing duplicate detections from a single physical
// step (which produces multiple threshold crossings).
//
// Rule: a step is accepted when the y-axis deviation from the last recorded
// y exceeds the threshold, the detector is not cooling down, and the
// re-trigger window since the last accepted step has elapsed. Acceptance
// arms a cooldown that is cleared by an external timer, not by samples.

use serde::{Deserialize, Serialize};

use crate::config::StepDetectionConfig;
use crate::sensor::AccelSample;

/// Detector phases: idle and ready to accept, or suppressed after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorPhase {
    Idle,
    CoolingDown,
}

/// Explicit detector state, passed to and returned from the transition
/// function. Owned by the sample worker; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorState {
    pub phase: DetectorPhase,
    /// Y value recorded at the last accepted step; only updated on acceptance.
    pub last_y: f64,
    /// Timestamp of the last accepted step. None until the first acceptance,
    /// which makes the re-trigger window check pass vacuously on a fresh
    /// detector regardless of the clock convention feeding the samples.
    pub last_step_ms: Option<u64>,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self {
            phase: DetectorPhase::Idle,
            last_y: 0.0,
            last_step_ms: None,
        }
    }
}

impl DetectorState {
    pub fn is_cooling_down(&self) -> bool {
        self.phase == DetectorPhase::CoolingDown
    }
}

/// Result of applying one sample to the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State after the sample.
    pub next: DetectorState,
    /// True when the sample was accepted as a step.
    pub stepped: bool,
}

/// Pure step detection over an explicit state.
///
/// The detector holds only configuration; all mutable state travels through
/// [`DetectorState`], which keeps the transition testable without timers or
/// channels.
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: StepDetectionConfig,
}

impl StepDetector {
    pub fn new(config: StepDetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StepDetectionConfig {
        &self.config
    }

    /// Apply one sample to the detector state.
    ///
    /// A step is accepted when all of the following hold:
    /// 1. |sample.y - state.last_y| > threshold_g
    /// 2. the detector is not cooling down
    /// 3. at least retrigger_ms elapsed since the last accepted step
    ///
    /// The third guard never fires independently: the cooldown outlasts the
    /// re-trigger window, so any sample inside it is already suppressed by
    /// guard 2. It is kept as deliberate duplication, not folded away.
    ///
    /// On acceptance the state records the sample's y and timestamp and
    /// enters the cooling-down phase; otherwise the state is returned
    /// unchanged.
    pub fn apply(&self, state: DetectorState, sample: &AccelSample) -> Transition {
        let crossed = (sample.y - state.last_y).abs() > self.config.threshold_g;
        let armed = state.phase == DetectorPhase::Idle;
        let retrigger_elapsed = state
            .last_step_ms
            .map(|last| sample.timestamp_ms.saturating_sub(last) > self.config.retrigger_ms)
            .unwrap_or(true);

        if crossed && armed && retrigger_elapsed {
            Transition {
                next: DetectorState {
                    phase: DetectorPhase::CoolingDown,
                    last_y: sample.y,
                    last_step_ms: Some(sample.timestamp_ms),
                },
                stepped: true,
            }
        } else {
            Transition {
                next: state,
                stepped: false,
            }
        }
    }

    /// Return the state with the cooldown cleared.
    ///
    /// Invoked by the engine's timer once the cooldown window elapses; the
    /// transition back to idle needs no sensor input.
    pub fn clear_cooldown(state: DetectorState) -> DetectorState {
        DetectorState {
            phase: DetectorPhase::Idle,
            ..state
        }
    }
}
