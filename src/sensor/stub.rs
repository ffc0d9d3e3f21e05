use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::TrackerError;

use super::{MotionBackend, SensorStartContext, TimeSource};

/// Backend for devices without an accelerometer.
///
/// Reports the capability as absent; the engine logs the condition and
/// never subscribes, leaving the counter at zero. `start` is defensive:
/// it refuses in case a caller bypasses the availability check.
#[derive(Default)]
pub struct UnavailableBackend {
    _unit: (),
}

impl MotionBackend for UnavailableBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _ctx: SensorStartContext) -> Result<(), TrackerError> {
        Err(TrackerError::SensorUnavailable)
    }

    fn stop(&self) -> Result<(), TrackerError> {
        Ok(())
    }
}

/// Deterministic time source for tests and CLI runs.
///
/// Each call to `now()` advances by a fixed 10ms to guarantee monotonic
/// timestamps even when no real sensor stream is active.
pub struct StubTimeSource {
    start: Instant,
    offset_ms: AtomicU64,
}

impl StubTimeSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }
}

impl Default for StubTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StubTimeSource {
    fn now(&self) -> Instant {
        let ms = self.offset_ms.fetch_add(10, Ordering::SeqCst);
        self.start + Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_backend_refuses_start() {
        let backend = UnavailableBackend::default();
        assert!(!backend.is_available());

        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        assert_eq!(
            backend.start(SensorStartContext { sample_tx: tx }),
            Err(TrackerError::SensorUnavailable)
        );
        assert!(backend.stop().is_ok());
    }

    #[test]
    fn test_stub_time_source_is_monotonic() {
        let source = StubTimeSource::new();
        let first = source.now();
        let second = source.now();
        assert!(second > first);
    }
}
