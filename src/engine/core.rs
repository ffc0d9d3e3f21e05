//! TrackerHandle: reusable tracking-session orchestration layer.
//!
//! This struct owns the motion backend, the shared session state (detector
//! phase + counter), the broadcast channels consumed by the presentation
//! layer, and the single sample worker that processes the sensor stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::api::{MotionMetrics, TrackerSnapshot};
use crate::config::{AppConfig, EnergyConfig};
use crate::detection::{DetectorState, StepCounter, StepDetector, StepEvent};
use crate::error::{log_tracker_error, TrackerError};
use crate::managers::BroadcastChannelManager;
use crate::sensor::{
    AccelSample, MotionBackend, SensorStartContext, SimulatedWalkBackend, SystemTimeSource,
    TimeSource, WalkProfile,
};

#[path = "core_subscriptions.rs"]
mod core_subscriptions;

/// Telemetry event emitted by the tracking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp_ms: u64,
    pub kind: TelemetryEventKind,
    pub detail: Option<String>,
}

/// Types of telemetry events supported by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEventKind {
    TrackingStarted,
    TrackingStopped,
    SensorUnavailable,
    StepsReset { previous_steps: u64 },
    Warning,
}

/// Mutable session state shared between the sample worker and the
/// snapshot/reset operations. The worker is the only sample-path writer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionState {
    pub detector: DetectorState,
    pub counter: StepCounter,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            detector: DetectorState::default(),
            counter: StepCounter::new(),
        }
    }
}

/// Messages interleaved with samples on the worker loop. The cooldown
/// clear arrives here from the timer task so its execution and sample
/// handling are mutually exclusive without locking.
enum ControlMessage {
    CooldownElapsed,
    Shutdown,
}

struct WorkerLink {
    control_tx: mpsc::UnboundedSender<ControlMessage>,
}

/// TrackerHandle orchestrates the detection pipeline and shared channels.
pub struct TrackerHandle {
    config: Arc<RwLock<AppConfig>>,
    backend: Arc<dyn MotionBackend>,
    session: Arc<RwLock<SessionState>>,
    pub(crate) broadcasts: BroadcastChannelManager,
    telemetry_tx: broadcast::Sender<TelemetryEvent>,
    link: Mutex<Option<WorkerLink>>,
    tracking: AtomicBool,
    sensor_active: AtomicBool,
    time_source: Arc<dyn TimeSource>,
    start_instant: Instant,
}

impl TrackerHandle {
    /// Create a new TrackerHandle with platform defaults.
    pub fn new() -> Self {
        let config = AppConfig::load();
        let backend = Self::create_backend(&config);
        Self::with_backend(backend, config)
    }

    /// Create a handle with an injected backend, for hosts that own the
    /// platform sampler and for deterministic test/CLI runs.
    pub fn with_backend(backend: Arc<dyn MotionBackend>, config: AppConfig) -> Self {
        let (telemetry_tx, _) = broadcast::channel(128);

        Self {
            config: Arc::new(RwLock::new(config)),
            backend,
            session: Arc::new(RwLock::new(SessionState::default())),
            broadcasts: BroadcastChannelManager::new(),
            telemetry_tx,
            link: Mutex::new(None),
            tracking: AtomicBool::new(false),
            sensor_active: AtomicBool::new(false),
            time_source: Arc::new(SystemTimeSource::default()),
            start_instant: Instant::now(),
        }
    }

    /// Default backend when the host injects none: the synthetic walker.
    /// Real platform samplers implement [`MotionBackend`] in the host shell
    /// and arrive via [`TrackerHandle::with_backend`].
    fn create_backend(config: &AppConfig) -> Arc<dyn MotionBackend> {
        Arc::new(SimulatedWalkBackend::new(WalkProfile {
            sample_rate_hz: config.sensor.sample_rate_hz,
            ..WalkProfile::default()
        }))
    }

    fn publish_event(
        tx: &broadcast::Sender<TelemetryEvent>,
        time_source: &Arc<dyn TimeSource>,
        start_instant: Instant,
        kind: TelemetryEventKind,
        detail: Option<String>,
    ) {
        let timestamp_ms = time_source
            .now()
            .saturating_duration_since(start_instant)
            .as_millis() as u64;
        let _ = tx.send(TelemetryEvent {
            timestamp_ms,
            kind,
            detail,
        });
    }

    fn emit_event(&self, kind: TelemetryEventKind, detail: Option<String>) {
        Self::publish_event(
            &self.telemetry_tx,
            &self.time_source,
            self.start_instant,
            kind,
            detail,
        );
    }

    // ========================================================================
    // SESSION LIFECYCLE
    // ========================================================================

    /// Whether the motion sensor capability exists on this device.
    pub fn is_sensor_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Start a tracking session.
    ///
    /// Spawns the sample worker and, when the sensor capability exists,
    /// subscribes to the motion backend exactly once. An absent sensor is
    /// not an error: the condition is logged and counting stays idle.
    pub fn start_tracking(&self) -> Result<(), TrackerError> {
        if self.tracking.swap(true, Ordering::SeqCst) {
            let err = TrackerError::AlreadyTracking;
            log_tracker_error(&err, "start_tracking");
            return Err(err);
        }

        match self.start_session() {
            Ok(()) => {
                self.emit_event(TelemetryEventKind::TrackingStarted, None);
                Ok(())
            }
            Err(err) => {
                // Roll back on every failure path so callbacks never fire
                // against a half-started session.
                self.teardown_worker();
                self.sensor_active.store(false, Ordering::SeqCst);
                self.tracking.store(false, Ordering::SeqCst);
                log_tracker_error(&err, "start_tracking");
                Err(err)
            }
        }
    }

    fn start_session(&self) -> Result<(), TrackerError> {
        let config = self.config_snapshot();

        // Re-arm the detector for the new session; the counter is owned by
        // the app state and survives until the user resets it.
        {
            let mut session = self.lock_session_mut()?;
            session.detector = DetectorState::default();
        }

        let steps_tx = self.broadcasts.init_steps();
        let snapshots_tx = self.broadcasts.init_snapshots();
        let motion_tx = Some(self.broadcasts.init_motion_metrics());

        let (sample_tx, sample_rx) = mpsc::channel(config.sensor.channel_capacity.max(1));
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let worker = SampleWorker {
            detector: StepDetector::new(config.step_detection.clone()),
            energy: config.energy.clone(),
            cooldown: Duration::from_millis(config.step_detection.cooldown_ms),
            log_every_n_samples: config.sensor.log_every_n_samples,
            session: Arc::clone(&self.session),
            steps_tx,
            snapshots_tx: snapshots_tx.clone(),
            motion_tx,
            control_tx: control_tx.clone(),
            time_source: Arc::clone(&self.time_source),
            start_instant: self.start_instant,
            samples_seen: 0,
            cooldown_task: None,
        };
        worker.spawn(sample_rx, control_rx);

        *self.lock_link()? = Some(WorkerLink { control_tx });

        if self.backend.is_available() {
            self.backend.start(SensorStartContext { sample_tx })?;
            self.sensor_active.store(true, Ordering::SeqCst);
        } else {
            // Indistinguishable from "not moving" for the UI; the count
            // simply never leaves zero.
            log::info!(
                "[TrackerHandle] accelerometer not available on this device; counting stays idle"
            );
            self.emit_event(TelemetryEventKind::SensorUnavailable, None);
        }

        // Publish the baseline so subscribers render current totals
        // without waiting for the first step.
        let _ = snapshots_tx.send(self.snapshot()?);

        Ok(())
    }

    /// Stop the tracking session.
    ///
    /// Releases the sensor subscription, shuts the worker down (aborting any
    /// pending cooldown clear), and keeps the step count intact.
    pub fn stop_tracking(&self) -> Result<(), TrackerError> {
        if !self.tracking.load(Ordering::SeqCst) {
            let err = TrackerError::NotTracking;
            log_tracker_error(&err, "stop_tracking");
            return Err(err);
        }

        // Release the subscription first so no further samples are
        // delivered to the torn-down worker.
        let backend_result = if self.sensor_active.swap(false, Ordering::SeqCst) {
            self.backend.stop()
        } else {
            Ok(())
        };

        self.teardown_worker();
        self.tracking.store(false, Ordering::SeqCst);
        self.emit_event(TelemetryEventKind::TrackingStopped, None);

        if let Err(ref err) = backend_result {
            log_tracker_error(err, "stop_tracking");
            self.emit_event(
                TelemetryEventKind::Warning,
                Some(format!("failed to release sensor subscription: {}", err)),
            );
        }
        backend_result
    }

    fn teardown_worker(&self) {
        if let Ok(mut link) = self.link.lock() {
            if let Some(link) = link.take() {
                let _ = link.control_tx.send(ControlMessage::Shutdown);
            }
        }
    }

    // ========================================================================
    // OBSERVABLE STATE
    // ========================================================================

    /// Reset the step count to zero. Unconditional; the derived calorie
    /// figure recomputes immediately and the fresh snapshot is broadcast.
    pub fn reset_steps(&self) -> Result<TrackerSnapshot, TrackerError> {
        let (previous_steps, snapshot) = {
            let mut session = self.lock_session_mut()?;
            let previous = session.counter.steps();
            session.counter.reset();
            (previous, self.snapshot_of(&session))
        };

        if let Some(tx) = self.broadcasts.snapshot_sender() {
            let _ = tx.send(snapshot);
        }
        self.emit_event(TelemetryEventKind::StepsReset { previous_steps }, None);
        log::info!("[TrackerHandle] step count reset (was {})", previous_steps);

        Ok(snapshot)
    }

    /// Current observable state: steps, display calories, cooldown flag.
    pub fn snapshot(&self) -> Result<TrackerSnapshot, TrackerError> {
        let session = self.session.read().map_err(|_| TrackerError::LockPoisoned {
            component: "session".to_string(),
        })?;
        Ok(self.snapshot_of(&session))
    }

    fn snapshot_of(&self, session: &SessionState) -> TrackerSnapshot {
        let calories_per_step = self
            .config
            .read()
            .map(|cfg| cfg.energy.calories_per_step)
            .unwrap_or_else(|err| err.into_inner().energy.calories_per_step);
        build_snapshot(session, calories_per_step, self.uptime_ms())
    }

    fn lock_session_mut(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, SessionState>, TrackerError> {
        self.session.write().map_err(|_| TrackerError::LockPoisoned {
            component: "session".to_string(),
        })
    }

    fn lock_link(&self) -> Result<std::sync::MutexGuard<'_, Option<WorkerLink>>, TrackerError> {
        self.link.lock().map_err(|_| TrackerError::LockPoisoned {
            component: "worker_link".to_string(),
        })
    }
}

fn build_snapshot(
    session: &SessionState,
    calories_per_step: f64,
    timestamp_ms: u64,
) -> TrackerSnapshot {
    TrackerSnapshot {
        steps: session.counter.steps(),
        calories: session.counter.calories_display(calories_per_step),
        cooling_down: session.detector.is_cooling_down(),
        timestamp_ms,
    }
}

// ========================================================================
// SAMPLE WORKER
// ========================================================================

/// Single consumer of the sensor stream.
///
/// Runs on a dedicated thread with a current-thread Tokio runtime so sample
/// handling and the cooldown timer share one executor: the timer callback
/// interleaves between samples but never races them.
struct SampleWorker {
    detector: StepDetector,
    energy: EnergyConfig,
    cooldown: Duration,
    log_every_n_samples: u64,
    session: Arc<RwLock<SessionState>>,
    steps_tx: broadcast::Sender<StepEvent>,
    snapshots_tx: broadcast::Sender<TrackerSnapshot>,
    motion_tx: Option<broadcast::Sender<MotionMetrics>>,
    control_tx: mpsc::UnboundedSender<ControlMessage>,
    time_source: Arc<dyn TimeSource>,
    start_instant: Instant,
    samples_seen: u64,
    cooldown_task: Option<tokio::task::JoinHandle<()>>,
}

impl SampleWorker {
    fn spawn(
        self,
        sample_rx: mpsc::Receiver<AccelSample>,
        control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    ) {
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime for sample worker");

            rt.block_on(self.run(sample_rx, control_rx));
        });
    }

    async fn run(
        mut self,
        mut sample_rx: mpsc::Receiver<AccelSample>,
        mut control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    ) {
        loop {
            tokio::select! {
                maybe_sample = sample_rx.recv() => match maybe_sample {
                    Some(sample) => self.handle_sample(sample),
                    None => break,
                },
                maybe_control = control_rx.recv() => match maybe_control {
                    Some(ControlMessage::CooldownElapsed) => self.handle_cooldown_elapsed(),
                    Some(ControlMessage::Shutdown) | None => break,
                },
            }
        }

        // A pending cooldown clear must never mutate state after teardown.
        if let Some(task) = self.cooldown_task.take() {
            task.abort();
        }
        log::debug!(
            "[Worker] sample worker stopped after {} samples",
            self.samples_seen
        );
    }

    fn handle_sample(&mut self, sample: AccelSample) {
        self.samples_seen += 1;

        let (step, snapshot, delta_y) = {
            let mut session = match self.session.write() {
                Ok(guard) => guard,
                Err(_) => {
                    log::error!("[Worker] session lock poisoned; dropping sample");
                    return;
                }
            };

            let delta_y = (sample.y - session.detector.last_y).abs();
            let transition = self.detector.apply(session.detector, &sample);
            session.detector = transition.next;

            if transition.stepped {
                session.counter.increment();
                let step = StepEvent {
                    timestamp_ms: sample.timestamp_ms,
                    delta_y,
                    step_index: session.counter.steps(),
                };
                let snapshot = build_snapshot(
                    &session,
                    self.energy.calories_per_step,
                    self.uptime_ms(),
                );
                (Some(step), Some(snapshot), delta_y)
            } else {
                (None, None, delta_y)
            }
        };

        if let (Some(step), Some(snapshot)) = (step, snapshot) {
            log::debug!(
                "[Worker] step {} at {} ms (delta_y {:.2} g)",
                step.step_index,
                step.timestamp_ms,
                step.delta_y
            );
            let _ = self.steps_tx.send(step);
            let _ = self.snapshots_tx.send(snapshot);
            self.schedule_cooldown_clear();
        }

        if let Some(tx) = &self.motion_tx {
            let _ = tx.send(MotionMetrics {
                timestamp_ms: sample.timestamp_ms,
                y: sample.y,
                delta_y,
                sample_number: self.samples_seen,
            });
        }

        if self.log_every_n_samples > 0 && self.samples_seen % self.log_every_n_samples == 0 {
            log::debug!("[Worker] {} samples processed", self.samples_seen);
        }
    }

    /// Arm the cooldown-clear timer, replacing any pending one.
    fn schedule_cooldown_clear(&mut self) {
        if let Some(previous) = self.cooldown_task.take() {
            previous.abort();
        }

        let control_tx = self.control_tx.clone();
        let cooldown = self.cooldown;
        self.cooldown_task = Some(tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            let _ = control_tx.send(ControlMessage::CooldownElapsed);
        }));
    }

    fn handle_cooldown_elapsed(&mut self) {
        self.cooldown_task = None;

        let snapshot = {
            let mut session = match self.session.write() {
                Ok(guard) => guard,
                Err(_) => {
                    log::error!("[Worker] session lock poisoned; cooldown clear dropped");
                    return;
                }
            };
            session.detector = StepDetector::clear_cooldown(session.detector);
            build_snapshot(&session, self.energy.calories_per_step, self.uptime_ms())
        };

        let _ = self.snapshots_tx.send(snapshot);
    }

    fn uptime_ms(&self) -> u64 {
        self.time_source
            .now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64
    }
}

// ========================================================================
// TEST HELPERS
// ========================================================================


impl Default for TrackerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        // Scoped release: a handle going away mid-session must still
        // release the sensor subscription and stop the worker.
        if self.tracking.load(Ordering::SeqCst) {
            let _ = self.stop_tracking();
        }
    }
}
