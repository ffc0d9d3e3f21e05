use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::TrackerError;

use super::{AccelSample, MotionBackend, SensorStartContext};

/// Deterministic backend that feeds a recorded trace into the engine.
///
/// Used by the diagnostics CLI and integration tests instead of live
/// hardware. Samples are delivered in order with `blocking_send` so none
/// are lost; pacing optionally inserts a fixed wall-clock delay between
/// samples so wall-clock-driven behavior (the cooldown timer) can be
/// exercised end to end.
pub struct ReplayBackend {
    samples: Arc<Vec<AccelSample>>,
    pacing: Option<Duration>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayBackend {
    pub fn new(samples: Vec<AccelSample>) -> Self {
        Self {
            samples: Arc::new(samples),
            pacing: None,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Insert a fixed delay between consecutive samples.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    fn lock_worker(&self) -> Result<std::sync::MutexGuard<'_, Option<JoinHandle<()>>>, TrackerError> {
        self.worker.lock().map_err(|_| TrackerError::LockPoisoned {
            component: "replay_backend".to_string(),
        })
    }
}

impl MotionBackend for ReplayBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self, ctx: SensorStartContext) -> Result<(), TrackerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TrackerError::AlreadyTracking);
        }

        let samples = Arc::clone(&self.samples);
        let pacing = self.pacing;
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            log::debug!("[Replay] feeding {} samples", samples.len());
            for sample in samples.iter() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if ctx.sample_tx.blocking_send(*sample).is_err() {
                    break;
                }
                if let Some(delay) = pacing {
                    std::thread::sleep(delay);
                }
            }
            // Trace exhausted: keep the subscription (and with it the sample
            // channel) held until the engine releases it via stop(), exactly
            // like a live sensor that has gone still.
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(10));
            }
        });

        *self.lock_worker()? = Some(handle);
        Ok(())
    }

    fn stop(&self) -> Result<(), TrackerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(TrackerError::NotTracking);
        }

        if let Some(handle) = self.lock_worker()?.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}
