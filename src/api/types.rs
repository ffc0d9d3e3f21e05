/// Observable tracker state published to the presentation layer
///
/// Snapshots are immutable: calories are derived from the step count at
/// creation time (never stored independently), so a snapshot can never
/// carry a stale estimate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackerSnapshot {
    /// Current step count
    pub steps: u64,
    /// Calorie estimate, rounded to two decimals for display
    pub calories: f64,
    /// True while the detector is mid-step (cooling down); drives the
    /// walking/sitting animation choice
    pub cooling_down: bool,
    /// Milliseconds since the tracker handle was created
    pub timestamp_ms: u64,
}

/// Per-sample metrics for debug visualization
///
/// Mirrors what the detector saw: the raw y value and its deviation from
/// the last recorded step value. Not part of the detection path.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionMetrics {
    /// Sample timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Raw y-axis acceleration in g
    pub y: f64,
    /// Absolute deviation from the last recorded step y, in g
    pub delta_y: f64,
    /// Sample number in the session stream
    pub sample_number: u64,
}
