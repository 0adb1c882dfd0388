//! Health state and graceful shutdown signalling.
//!
//! Uses `ArcSwap` for lock-free health state reads on the probe path and a
//! `watch` channel to fan the shutdown signal out to the serve loop.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Server health state.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Initializing; not yet accepting requests.
    Starting,
    /// Fully operational.
    Ready,
    /// Shutdown signalled; existing connections are being drained.
    Draining,
    /// All connections drained; the process is about to exit.
    Stopped,
}

impl HealthState {
    /// Lowercase name used in health responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Starting => "starting",
            HealthState::Ready => "ready",
            HealthState::Draining => "draining",
            HealthState::Stopped => "stopped",
        }
    }
}

/// Coordinates health state transitions and the shutdown signal.
///
/// Readiness probes read `health_state()`; the serve loop subscribes via
/// `shutdown_receiver()` and begins draining when `trigger_shutdown()` fires.
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    /// Marks the server ready to accept requests.
    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Initiates graceful shutdown: transitions to `Draining` and notifies
    /// all shutdown receivers.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
        // Receivers may already be gone during teardown.
        let _ = self.shutdown_signal.send(true);
    }

    /// Marks the drain complete.
    pub fn set_stopped(&self) {
        self.health_state.store(Arc::new(HealthState::Stopped));
    }

    /// Returns a receiver notified when shutdown is triggered.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Returns the current health state.
    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_full_state_machine() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);

        controller.set_stopped();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn trigger_notifies_subscribed_receivers() {
        let controller = ShutdownController::new();
        let mut rx = controller.shutdown_receiver();

        controller.trigger_shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[test]
    fn trigger_without_receivers_does_not_panic() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);
    }

    #[test]
    fn state_names_match_probe_vocabulary() {
        assert_eq!(HealthState::Starting.as_str(), "starting");
        assert_eq!(HealthState::Ready.as_str(), "ready");
        assert_eq!(HealthState::Draining.as_str(), "draining");
        assert_eq!(HealthState::Stopped.as_str(), "stopped");
    }
}
