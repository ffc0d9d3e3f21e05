//! End-to-end detection scenarios driven through replayed traces
//!
//! Each test feeds a deterministic accelerometer trace through a full
//! tracking session and asserts on the observable outcome: step count,
//! derived calories, and the cooldown flag.

use std::sync::Arc;
use std::time::Duration;

use step_tracker::config::AppConfig;
use step_tracker::engine::TrackerHandle;
use step_tracker::sensor::ReplayBackend;
use step_tracker::testing::fixtures;

fn session(samples: Vec<step_tracker::sensor::AccelSample>, config: AppConfig) -> TrackerHandle {
    TrackerHandle::with_backend(Arc::new(ReplayBackend::new(samples)), config)
}

fn short_cooldown_config(cooldown_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.step_detection.cooldown_ms = cooldown_ms;
    config
}

/// A still device never counts: every deviation stays below the threshold.
#[test]
fn test_quiet_trace_counts_nothing() {
    let handle = session(fixtures::quiet_trace(3000, 42), AppConfig::default());

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(300));

    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 0);
    assert_eq!(snapshot.calories, 0.0);
    assert!(!snapshot.cooling_down);

    handle.stop_tracking().expect("stop should succeed");
}

/// The canonical suppression trace: two qualifying crossings less than the
/// cooldown window apart count exactly once.
#[test]
fn test_cooldown_suppresses_second_crossing() {
    let handle = session(fixtures::suppression_trace(), AppConfig::default());

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(300));

    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 1);
    assert_eq!(snapshot.calories, 0.05);
    assert!(snapshot.cooling_down, "1200ms cooldown still active");

    handle.stop_tracking().expect("stop should succeed");
}

/// Crossings separated by more than the cooldown window all count.
#[test]
fn test_spaced_crossings_all_count() {
    let trace = fixtures::walk_trace(&[100, 1000, 1900, 2800]);
    let backend = ReplayBackend::new(trace).with_pacing(Duration::from_millis(120));
    let handle =
        TrackerHandle::with_backend(Arc::new(backend), short_cooldown_config(80));

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(900));

    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 4);
    assert_eq!(snapshot.calories, 0.2);

    handle.stop_tracking().expect("stop should succeed");
}

/// The cooling-down flag drops back once the window elapses, without any
/// further sensor input.
#[test]
fn test_cooldown_flag_clears_without_samples() {
    let trace = fixtures::walk_trace(&[0]);
    let handle = session(trace, short_cooldown_config(100));

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(60));
    assert!(
        handle.snapshot().unwrap().cooling_down,
        "cooldown should be active right after the step"
    );

    std::thread::sleep(Duration::from_millis(300));
    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 1);
    assert!(!snapshot.cooling_down, "cooldown should have cleared");

    handle.stop_tracking().expect("stop should succeed");
}

/// Calories always derive from the count, including through a reset.
#[test]
fn test_calories_track_count_through_reset() {
    let trace = fixtures::walk_trace(&[100, 1000, 1900]);
    let backend = ReplayBackend::new(trace).with_pacing(Duration::from_millis(120));
    let handle =
        TrackerHandle::with_backend(Arc::new(backend), short_cooldown_config(80));

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(700));

    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 3);
    assert!((snapshot.calories - 0.15).abs() < 1e-9);

    let reset = handle.reset_steps().expect("reset should succeed");
    assert_eq!(reset.steps, 0);
    assert_eq!(reset.calories, 0.0);

    // Snapshot reads agree with the reset result immediately
    let after = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(after.steps, 0);
    assert_eq!(after.calories, 0.0);

    handle.stop_tracking().expect("stop should succeed");
}

/// Step events stream in order with a running 1-based index.
#[test]
fn test_step_event_stream_order() {
    let trace = fixtures::walk_trace(&[100, 1000]);
    let backend = ReplayBackend::new(trace).with_pacing(Duration::from_millis(120));
    let handle =
        TrackerHandle::with_backend(Arc::new(backend), short_cooldown_config(80));

    handle.start_tracking().expect("start should succeed");
    let mut steps_rx = handle.subscribe_steps();

    std::thread::sleep(Duration::from_millis(600));
    handle.stop_tracking().expect("stop should succeed");

    let first = steps_rx.blocking_recv().expect("first step event");
    let second = steps_rx.blocking_recv().expect("second step event");
    assert_eq!((first.step_index, second.step_index), (1, 2));
    assert_eq!(first.timestamp_ms, 100);
    assert_eq!(second.timestamp_ms, 1000);
}
