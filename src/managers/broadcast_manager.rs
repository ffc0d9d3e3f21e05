// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::api::{MotionMetrics, TrackerSnapshot};
use crate::detection::StepEvent;

/// Manages all tokio broadcast channels
///
/// Centralizes broadcast channel creation, storage, and subscription
/// handling so producers and consumers never hold senders directly.
///
/// # Channel Types
/// - Steps: one event per accepted step
/// - Snapshots: observable state (count, calories, cooldown flag) on change
/// - Motion Metrics: per-sample debug metrics for development UIs
pub struct BroadcastChannelManager {
    steps: Arc<Mutex<Option<broadcast::Sender<StepEvent>>>>,
    snapshots: Arc<Mutex<Option<broadcast::Sender<TrackerSnapshot>>>>,
    motion_metrics: Arc<Mutex<Option<broadcast::Sender<MotionMetrics>>>>,
}

impl BroadcastChannelManager {
    /// Create a new BroadcastChannelManager with all channels uninitialized
    ///
    /// Channels must be explicitly initialized via init_* methods before use.
    pub fn new() -> Self {
        Self {
            steps: Arc::new(Mutex::new(None)),
            snapshots: Arc::new(Mutex::new(None)),
            motion_metrics: Arc::new(Mutex::new(None)),
        }
    }

    // ========================================================================
    // STEP EVENTS CHANNEL
    // ========================================================================

    /// Initialize the step events broadcast channel
    ///
    /// Returns the sender for the sample worker to publish accepted steps.
    /// Buffer size 100: at one step per cooldown window that is well over a
    /// minute of burst headroom for lagging subscribers.
    pub fn init_steps(&self) -> broadcast::Sender<StepEvent> {
        let (tx, _) = broadcast::channel(100);
        *self.steps.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to accepted steps
    ///
    /// Returns None if init_steps() has not been called yet. Each subscriber
    /// gets an independent receiver.
    pub fn subscribe_steps(&self) -> Option<broadcast::Receiver<StepEvent>> {
        self.steps.lock().unwrap().as_ref().map(|tx| tx.subscribe())
    }

    // ========================================================================
    // SNAPSHOT CHANNEL
    // ========================================================================

    /// Initialize the snapshot broadcast channel
    ///
    /// Returns the sender used by the worker and by reset_steps to publish
    /// observable-state changes.
    pub fn init_snapshots(&self) -> broadcast::Sender<TrackerSnapshot> {
        let (tx, _) = broadcast::channel(50);
        *self.snapshots.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to observable-state snapshots
    ///
    /// Returns None if init_snapshots() has not been called yet.
    pub fn subscribe_snapshots(&self) -> Option<broadcast::Receiver<TrackerSnapshot>> {
        self.snapshots
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }

    /// Current snapshot sender, if the channel is initialized
    ///
    /// Used by operations outside the worker (reset) that publish state.
    pub fn snapshot_sender(&self) -> Option<broadcast::Sender<TrackerSnapshot>> {
        self.snapshots.lock().unwrap().clone()
    }

    // ========================================================================
    // MOTION METRICS CHANNEL (DEBUG)
    // ========================================================================

    /// Initialize the motion metrics broadcast channel
    ///
    /// Per-sample debug stream; not part of the detection path.
    pub fn init_motion_metrics(&self) -> broadcast::Sender<MotionMetrics> {
        let (tx, _) = broadcast::channel(100);
        *self.motion_metrics.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to motion metrics
    ///
    /// Returns None if init_motion_metrics() has not been called yet.
    pub fn subscribe_motion_metrics(&self) -> Option<broadcast::Receiver<MotionMetrics>> {
        self.motion_metrics
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_channel_lifecycle() {
        let manager = BroadcastChannelManager::new();

        // Initially no subscription possible
        assert!(manager.subscribe_steps().is_none());

        // Initialize channel
        let _tx = manager.init_steps();

        // Now subscription works
        assert!(manager.subscribe_steps().is_some());
    }

    #[test]
    fn test_steps_multiple_subscribers() {
        let manager = BroadcastChannelManager::new();
        let tx = manager.init_steps();

        let mut rx1 = manager.subscribe_steps().unwrap();
        let mut rx2 = manager.subscribe_steps().unwrap();

        let event = StepEvent {
            timestamp_ms: 100,
            delta_y: 1.2,
            step_index: 1,
        };
        tx.send(event).unwrap();

        // Both subscribers receive the message
        assert_eq!(rx1.try_recv().unwrap(), event);
        assert_eq!(rx2.try_recv().unwrap(), event);
    }

    #[test]
    fn test_snapshot_channel_lifecycle() {
        let manager = BroadcastChannelManager::new();

        assert!(manager.subscribe_snapshots().is_none());
        assert!(manager.snapshot_sender().is_none());

        let _tx = manager.init_snapshots();

        assert!(manager.subscribe_snapshots().is_some());
        assert!(manager.snapshot_sender().is_some());
    }

    #[test]
    fn test_motion_metrics_channel_lifecycle() {
        let manager = BroadcastChannelManager::new();

        assert!(manager.subscribe_motion_metrics().is_none());

        let _tx = manager.init_motion_metrics();

        assert!(manager.subscribe_motion_metrics().is_some());
    }

    #[test]
    fn test_default_implementation() {
        let manager = BroadcastChannelManager::default();

        // All channels should be uninitialized
        assert!(manager.subscribe_steps().is_none());
        assert!(manager.subscribe_snapshots().is_none());
        assert!(manager.subscribe_motion_metrics().is_none());
    }
}
