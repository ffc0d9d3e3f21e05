use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TrackerError;

use super::{AccelSample, MotionBackend, SensorStartContext};

/// Signal shape for the simulated walker.
#[derive(Debug, Clone)]
pub struct WalkProfile {
    /// Sampling rate of the synthetic stream in Hz.
    pub sample_rate_hz: u32,
    /// Milliseconds between simulated foot strikes.
    pub step_interval_ms: u64,
    /// Peak y value of the upward strike, in g.
    pub strike_high_g: f64,
    /// Y value of the counter-swing, in g.
    pub strike_low_g: f64,
    /// Half-width of the uniform jitter added to every sample, in g.
    pub jitter_g: f64,
    /// RNG seed so runs are reproducible.
    pub seed: u64,
}

impl Default for WalkProfile {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            step_interval_ms: 900,
            // Strikes alternate so each deviates by more than the detection
            // threshold from the previously recorded strike value.
            strike_high_g: 1.5,
            strike_low_g: -0.5,
            jitter_g: 0.05,
            seed: 7,
        }
    }
}

/// Synthetic walking backend.
///
/// Produces a jittery baseline with alternating strike spikes at a fixed
/// cadence on a dedicated thread, standing in for the platform accelerometer
/// in CLI runs and demos. Always reports itself available.
pub struct SimulatedWalkBackend {
    profile: WalkProfile,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedWalkBackend {
    pub fn new(profile: WalkProfile) -> Self {
        Self {
            profile,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    fn lock_worker(&self) -> Result<std::sync::MutexGuard<'_, Option<JoinHandle<()>>>, TrackerError> {
        self.worker.lock().map_err(|_| TrackerError::LockPoisoned {
            component: "simulated_backend".to_string(),
        })
    }
}

impl Default for SimulatedWalkBackend {
    fn default() -> Self {
        Self::new(WalkProfile::default())
    }
}

impl MotionBackend for SimulatedWalkBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self, ctx: SensorStartContext) -> Result<(), TrackerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TrackerError::AlreadyTracking);
        }

        let profile = self.profile.clone();
        let running = Arc::clone(&self.running);
        let handle = std::thread::spawn(move || run_walker(profile, running, ctx));

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

fn run_walker(profile: WalkProfile, running: Arc<AtomicBool>, ctx: SensorStartContext) {
    let tick = Duration::from_millis((1000 / profile.sample_rate_hz.max(1)) as u64);
    let tick_ms = tick.as_millis() as u64;
    let mut rng = StdRng::seed_from_u64(profile.seed);
    let mut dropped: u64 = 0;

    let mut now_ms: u64 = 0;
    let mut next_strike_ms: u64 = profile.step_interval_ms;
    let mut strike_high = true;

    log::debug!(
        "[SimulatedWalk] producing samples at {} Hz, strike every {} ms",
        profile.sample_rate_hz,
        profile.step_interval_ms
    );

    while running.load(Ordering::SeqCst) {
        let jitter = rng.gen_range(-profile.jitter_g..=profile.jitter_g);
        let y = if now_ms >= next_strike_ms {
            next_strike_ms += profile.step_interval_ms;
            let strike = if strike_high {
                profile.strike_high_g
            } else {
                profile.strike_low_g
            };
            strike_high = !strike_high;
            strike + jitter
        } else {
            jitter
        };

        let sample = AccelSample::new(now_ms, jitter, y, 1.0 + jitter);
        match ctx.sample_tx.try_send(sample) {
            Ok(()) => {}
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                dropped += 1;
                if dropped % 100 == 1 {
                    log::warn!(
                        "[SimulatedWalk] sample channel full, {} dropped so far",
                        dropped
                    );
                }
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => break,
        }

        now_ms += tick_ms;
        std::thread::sleep(tick);
    }
}
