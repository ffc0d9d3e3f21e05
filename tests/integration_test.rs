//! Integration tests for the tracking session lifecycle
//!
//! These tests validate the full session lifecycle across the Rust layer,
//! including:
//! - Session start/stop lifecycle and double-start/stop rejection
//! - The unavailable-sensor path (graceful, never fatal)
//! - Reset semantics and snapshot derivation
//! - Stream behavior (subscribe, receive)

use std::sync::Arc;
use std::time::Duration;

use step_tracker::config::AppConfig;
use step_tracker::engine::{TelemetryEventKind, TrackerHandle};
use step_tracker::error::TrackerError;
use step_tracker::sensor::{ReplayBackend, SimulatedWalkBackend, UnavailableBackend};
use step_tracker::testing::fixtures;

fn replay_handle(samples: Vec<step_tracker::sensor::AccelSample>) -> TrackerHandle {
    TrackerHandle::with_backend(Arc::new(ReplayBackend::new(samples)), AppConfig::default())
}

/// Test that TrackerHandle can be created successfully
#[test]
fn test_tracker_handle_creation() {
    let handle = TrackerHandle::new();
    // The handle should be in a clean initial state
    assert!(!handle.is_tracking());
    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 0);
    drop(handle);
}

/// Test session lifecycle: start -> stop with the simulated backend
#[test]
fn test_session_lifecycle_simulated() {
    let handle = TrackerHandle::with_backend(
        Arc::new(SimulatedWalkBackend::default()),
        AppConfig::default(),
    );

    assert!(handle.is_sensor_available());
    assert!(
        handle.start_tracking().is_ok(),
        "start_tracking should succeed on the simulated backend"
    );
    assert!(handle.is_tracking());
    assert!(
        handle.stop_tracking().is_ok(),
        "stop_tracking should succeed after starting"
    );
    assert!(!handle.is_tracking());
}

/// Test double-start prevention (AlreadyTracking error)
#[test]
fn test_double_start_prevention() {
    let handle = replay_handle(Vec::new());

    handle.start_tracking().expect("first start should succeed");

    let result = handle.start_tracking();
    assert!(result.is_err(), "second start should be rejected");
    match result.unwrap_err() {
        TrackerError::AlreadyTracking => {}
        other => panic!("Expected AlreadyTracking, got {:?}", other),
    }

    handle.stop_tracking().expect("stop should succeed");
}

/// Test stop without start (NotTracking error)
#[test]
fn test_stop_without_start() {
    let handle = replay_handle(Vec::new());

    match handle.stop_tracking() {
        Err(TrackerError::NotTracking) => {}
        other => panic!("Expected NotTracking, got {:?}", other),
    }
}

/// Test the absent-sensor path: session starts, count stays at zero,
/// teardown is still clean
#[test]
fn test_unavailable_sensor_is_not_fatal() {
    let handle = TrackerHandle::with_backend(
        Arc::new(UnavailableBackend::default()),
        AppConfig::default(),
    );
    let mut telemetry_rx = handle.telemetry_receiver();

    assert!(!handle.is_sensor_available());
    handle
        .start_tracking()
        .expect("absent sensor must not fail the session start");

    std::thread::sleep(Duration::from_millis(100));
    let snapshot = handle.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.steps, 0, "no samples means a perpetual zero count");

    handle.stop_tracking().expect("teardown must still succeed");

    let mut kinds = Vec::new();
    while let Ok(event) = telemetry_rx.try_recv() {
        kinds.push(event.kind);
    }
    assert!(kinds.contains(&TelemetryEventKind::SensorUnavailable));
    assert!(kinds.contains(&TelemetryEventKind::TrackingStarted));
    assert!(kinds.contains(&TelemetryEventKind::TrackingStopped));
}

/// Test reset: always zeroes the count and the derived calories, with or
/// without a running session
#[test]
fn test_reset_always_succeeds() {
    let handle = replay_handle(fixtures::suppression_trace());

    // Reset before any session
    let snapshot = handle.reset_steps().expect("reset should succeed");
    assert_eq!(snapshot.steps, 0);
    assert_eq!(snapshot.calories, 0.0);

    handle.start_tracking().expect("start should succeed");
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(handle.snapshot().unwrap().steps, 1);

    // Reset mid-session
    let snapshot = handle.reset_steps().expect("reset should succeed");
    assert_eq!(snapshot.steps, 0);
    assert_eq!(snapshot.calories, 0.0);

    handle.stop_tracking().expect("stop should succeed");
}

/// Test that the snapshot stream delivers state changes to subscribers
#[test]
fn test_snapshot_stream_delivers_reset() {
    let handle = replay_handle(Vec::new());
    handle.start_tracking().expect("start should succeed");

    let mut snapshots_rx = handle.subscribe_snapshots();

    let _ = handle.reset_steps().expect("reset should succeed");

    let received = snapshots_rx
        .blocking_recv()
        .expect("subscriber should receive the reset snapshot");
    assert_eq!(received.steps, 0);

    handle.stop_tracking().expect("stop should succeed");
}

/// Test telemetry ordering across a full session
#[test]
fn test_telemetry_lifecycle_events() {
    let handle = replay_handle(Vec::new());
    let mut telemetry_rx = handle.telemetry_receiver();

    handle.start_tracking().expect("start should succeed");
    handle.stop_tracking().expect("stop should succeed");

    let first = telemetry_rx.try_recv().expect("expected started event");
    let second = telemetry_rx.try_recv().expect("expected stopped event");
    assert_eq!(first.kind, TelemetryEventKind::TrackingStarted);
    assert_eq!(second.kind, TelemetryEventKind::TrackingStopped);
    assert!(second.timestamp_ms >= first.timestamp_ms);
}
