use futures::Stream;

use crate::detection::StepEvent;
use crate::engine::TelemetryEvent;

use super::{MotionMetrics, TrackerSnapshot, TRACKER_HANDLE};

/// Stream of accepted steps
///
/// Yields one StepEvent per counted step while a tracking session is
/// running. Empty (never yields) if no session has initialized the channel.
pub async fn step_events_stream() -> impl Stream<Item = StepEvent> {
    TRACKER_HANDLE.step_events_stream().await
}

/// Stream of observable-state snapshots
///
/// Yields a fresh TrackerSnapshot whenever the count, the calorie figure,
/// or the cooling-down flag changes. The presentation layer renders from
/// this stream instead of closing over mutable state.
pub async fn snapshot_stream() -> impl Stream<Item = TrackerSnapshot> {
    TRACKER_HANDLE.snapshot_stream().await
}

/// Stream of per-sample motion metrics for debug visualization
pub async fn motion_metrics_stream() -> impl Stream<Item = MotionMetrics> {
    TRACKER_HANDLE.motion_metrics_stream().await
}

/// Stream of telemetry events for debug instrumentation
///
/// Emits session lifecycle events (start/stop, sensor availability,
/// resets) and warnings.
pub async fn telemetry_stream() -> impl Stream<Item = TelemetryEvent> {
    TRACKER_HANDLE.telemetry_stream().await
}
