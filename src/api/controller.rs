//! Tracking controller
//!
//! Toggles the location subscription on and off and routes delivered fixes
//! through the speed estimator to the display. Providers may call the
//! registered handler from their own thread; the handler only queues the fix,
//! and [`TrackingController::pump`] processes the queue on the thread that
//! owns the controller.

use crate::algorithms::speed::SpeedEstimator;
use crate::api::display::SpeedDisplay;
use crate::api::types::{ApiResult, ControllerConfig, TrackingStats};
use crate::core::{Fix, SpeedReading, TrackingState};
use crate::hardware::LocationProvider;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info, warn};

pub struct TrackingController<P: LocationProvider, D: SpeedDisplay> {
    provider: P,
    display: D,
    estimator: SpeedEstimator,
    config: ControllerConfig,
    state: TrackingState,
    fix_tx: Sender<Fix>,
    fix_rx: Receiver<Fix>,
    stats: TrackingStats,
}

impl<P: LocationProvider, D: SpeedDisplay> TrackingController<P, D> {
    /// Create a stopped controller and render the initial display state
    pub fn new(provider: P, mut display: D, config: ControllerConfig) -> Self {
        let (fix_tx, fix_rx) = mpsc::channel();
        let state = TrackingState::Stopped;

        display.show_speed(&SpeedReading::zero());
        display.show_control_label(state.control_label());

        Self {
            provider,
            display,
            estimator: SpeedEstimator::with_policy(config.time_delta_policy),
            config,
            state,
            fix_tx,
            fix_rx,
            stats: TrackingStats::default(),
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn stats(&self) -> &TrackingStats {
        &self.stats
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn estimator(&self) -> &SpeedEstimator {
        &self.estimator
    }

    /// Flip between stopped and tracking; returns the new state
    pub fn toggle(&mut self) -> ApiResult<TrackingState> {
        match self.state {
            TrackingState::Stopped => self.start_tracking(),
            TrackingState::Tracking => self.stop_tracking(),
        }
    }

    /// Release the subscription if tracking; a no-op while stopped
    pub fn shutdown(&mut self) -> ApiResult<TrackingState> {
        if self.state.is_tracking() {
            info!("shutting down active tracking");
            self.release_subscription()?;
        }
        Ok(self.state)
    }

    fn start_tracking(&mut self) -> ApiResult<TrackingState> {
        let fix_tx = self.fix_tx.clone();
        self.provider.configure(Box::new(move |fix| {
            // the controller is gone once the receiver is dropped
            let _ = fix_tx.send(fix);
        }));

        // fixes left over from an earlier session must not pair with new ones
        let stale = self.fix_rx.try_iter().count();
        if stale > 0 {
            debug!(stale, "discarded queued fixes from previous session");
        }
        self.estimator.reset();
        self.stats = TrackingStats::default();

        if let Err(e) = self.provider.start(&self.config.thresholds) {
            error!(provider = self.provider.name(), "Failed to start location updates: {}", e);
            return Err(e.into());
        }

        self.state = TrackingState::Tracking;
        self.display.show_control_label(self.state.control_label());
        info!(
            provider = self.provider.name(),
            min_interval_ms = self.config.thresholds.min_interval_ms,
            min_distance_m = self.config.thresholds.min_distance_m,
            "tracking started"
        );
        Ok(self.state)
    }

    fn stop_tracking(&mut self) -> ApiResult<TrackingState> {
        let result = self.release_subscription();
        self.display.show_control_label(self.state.control_label());
        result.map(|_| self.state)
    }

    /// Stop the provider; the controller ends up stopped even if that fails
    fn release_subscription(&mut self) -> ApiResult<()> {
        let result = self.provider.stop();
        self.state = TrackingState::Stopped;

        match result {
            Ok(()) => {
                info!(provider = self.provider.name(), "tracking stopped");
                Ok(())
            }
            Err(e) => {
                error!(provider = self.provider.name(), "Failed to stop location updates: {}", e);
                Err(e.into())
            }
        }
    }

    /// Process a single fix, showing the resulting reading if there is one
    pub fn handle_fix(&mut self, fix: Fix) -> ApiResult<Option<SpeedReading>> {
        self.stats.fixes_received += 1;

        match self.estimator.on_fix(fix) {
            Ok(Some(reading)) => {
                self.stats.record_reading(reading);
                self.display.show_speed(&reading);
                Ok(Some(reading))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.stats.fixes_rejected += 1;
                Err(e.into())
            }
        }
    }

    /// Process every fix queued by the provider; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(fix) = self.fix_rx.try_recv() {
            processed += 1;
            if let Err(e) = self.handle_fix(fix) {
                warn!("Dropped fix: {}", e);
            }
        }
        processed
    }
}

impl<P: LocationProvider, D: SpeedDisplay> Drop for TrackingController<P, D> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to release location updates on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::haversine::distance;
    use crate::algorithms::speed::{SpeedError, TimeDeltaPolicy};
    use crate::api::display::RecordingDisplay;
    use crate::api::types::ApiError;
    use crate::core::UpdateThresholds;
    use crate::hardware::{MockProvider, ProviderError, ReplayProvider, Track, TrackSample};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn controller() -> TrackingController<MockProvider, RecordingDisplay> {
        TrackingController::new(MockProvider::new(), RecordingDisplay::new(), ControllerConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();
        assert_eq!(controller.state(), TrackingState::Stopped);
        assert_eq!(controller.display().current_label(), Some("Start Tracking"));
        assert_eq!(controller.display().last_reading().map(|r| r.kilometers_per_hour), Some(0.0));
        assert_eq!(controller.provider().start_count(), 0);
    }

    #[test]
    fn test_toggle_starts_and_stops_provider() {
        let mut controller = controller();

        assert_eq!(controller.toggle(), Ok(TrackingState::Tracking));
        assert!(controller.provider().is_running());
        assert_eq!(controller.provider().start_count(), 1);
        assert_eq!(controller.display().current_label(), Some("Stop Tracking"));

        assert_eq!(controller.toggle(), Ok(TrackingState::Stopped));
        assert!(!controller.provider().is_running());
        assert_eq!(controller.provider().stop_count(), 1);
        assert_eq!(controller.display().current_label(), Some("Start Tracking"));
    }

    #[test]
    fn test_default_thresholds_requested() {
        let mut controller = controller();
        controller.toggle().unwrap();
        assert_eq!(
            controller.provider().start_calls(),
            &[UpdateThresholds {
                min_interval_ms: 1000,
                min_distance_m: 1.0
            }]
        );
    }

    #[test]
    fn test_fixes_flow_to_display() {
        let mut controller = controller();
        controller.toggle().unwrap();

        let delivered = controller
            .provider()
            .deliver_all(vec![Fix::new(0.0, 0.0, 0.0), Fix::new(0.0, 0.001, 10.0)]);
        assert_eq!(delivered, 2);
        assert_eq!(controller.pump(), 2);

        let expected = distance(0.0, 0.0, 0.0, 0.001) / 10.0 * 3.6;
        let shown = controller.display().last_reading().unwrap();
        assert!((shown.kilometers_per_hour - expected).abs() < 1e-9);
        assert_eq!(controller.stats().fixes_received, 2);
        assert_eq!(controller.stats().readings_produced, 1);
    }

    #[test]
    fn test_first_fix_after_restart_produces_no_reading() {
        let mut controller = controller();
        controller.toggle().unwrap();
        controller.handle_fix(Fix::new(0.0, 0.0, 0.0)).unwrap();
        controller.toggle().unwrap();

        controller.toggle().unwrap();
        assert!(controller.estimator().previous_fix().is_none());
        assert_eq!(controller.handle_fix(Fix::new(0.0, 0.001, 100.0)), Ok(None));
        assert!(controller.handle_fix(Fix::new(0.0, 0.002, 110.0)).unwrap().is_some());
    }

    #[test]
    fn test_in_flight_fix_after_stop_is_processed() {
        let mut controller = controller();
        controller.toggle().unwrap();
        controller.provider().deliver_all(vec![Fix::new(0.0, 0.0, 0.0), Fix::new(0.0, 0.001, 10.0)]);
        controller.toggle().unwrap();

        assert_eq!(controller.pump(), 2);
        assert_eq!(controller.stats().readings_produced, 1);
    }

    #[test]
    fn test_queued_fixes_discarded_on_restart() {
        let mut controller = controller();
        controller.toggle().unwrap();
        controller.provider().deliver(Fix::new(0.0, 0.0, 0.0));
        controller.toggle().unwrap();

        controller.toggle().unwrap();
        assert_eq!(controller.pump(), 0);
    }

    #[test]
    fn test_failed_start_stays_stopped() {
        let mut controller = controller();
        controller.provider_mut().deny_permission(true);

        let result = controller.toggle();
        assert_eq!(result, Err(ApiError::Provider(ProviderError::PermissionDenied)));
        assert_eq!(controller.state(), TrackingState::Stopped);
        assert_eq!(controller.display().current_label(), Some("Start Tracking"));
        assert_eq!(controller.display().labels.len(), 1);

        controller.provider_mut().deny_permission(false);
        assert_eq!(controller.toggle(), Ok(TrackingState::Tracking));
    }

    #[test]
    fn test_failed_stop_still_stops() {
        let mut controller = controller();
        controller.toggle().unwrap();
        controller
            .provider_mut()
            .fail_next_stop(ProviderError::Unavailable { reason: "service gone".to_string() });

        assert!(matches!(controller.toggle(), Err(ApiError::Provider(_))));
        assert_eq!(controller.state(), TrackingState::Stopped);
        assert_eq!(controller.display().current_label(), Some("Start Tracking"));
    }

    #[test]
    fn test_shutdown_while_tracking_stops_once() {
        let mut controller = controller();
        controller.toggle().unwrap();

        assert_eq!(controller.shutdown(), Ok(TrackingState::Stopped));
        assert_eq!(controller.provider().stop_count(), 1);

        assert_eq!(controller.shutdown(), Ok(TrackingState::Stopped));
        assert_eq!(controller.provider().stop_count(), 1);
    }

    #[test]
    fn test_drop_while_tracking_stops_provider() {
        let mut controller = controller();
        let stops = controller.provider().stop_counter();
        controller.toggle().unwrap();

        drop(controller);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_while_stopped_leaves_provider_alone() {
        let mut controller = controller();
        let stops = controller.provider().stop_counter();
        controller.toggle().unwrap();
        controller.toggle().unwrap();

        drop(controller);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_ends_replay_delivery() {
        let (tx, rx) = mpsc::channel::<Fix>();
        let track = Track {
            samples: (0..3)
                .map(|i| TrackSample {
                    lat: 0.0,
                    lon: i as f64 * 0.0001,
                    offset_ms: i as u64 * 200,
                    altitude: None,
                    accuracy: None,
                })
                .collect(),
        };
        let mut controller =
            TrackingController::new(ReplayProvider::new(track), RecordingDisplay::new(), ControllerConfig::default());
        controller.toggle().unwrap();
        // route fixes to the test instead of the controller queue
        controller.provider_mut().configure(Box::new(move |fix| {
            let _ = tx.send(fix);
        }));

        drop(controller);
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(800)).is_err());
    }

    #[test]
    fn test_stats_reset_on_restart() {
        let mut controller = controller();
        controller.toggle().unwrap();
        controller.handle_fix(Fix::new(0.0, 0.0, 0.0)).unwrap();
        controller.handle_fix(Fix::new(0.0, 0.001, 10.0)).unwrap();
        assert_eq!(controller.stats().readings_produced, 1);

        controller.toggle().unwrap();
        controller.toggle().unwrap();
        assert_eq!(controller.stats(), &TrackingStats::default());
    }

    #[test]
    fn test_shutdown_while_stopped_does_nothing() {
        let mut controller = controller();
        assert_eq!(controller.shutdown(), Ok(TrackingState::Stopped));
        assert_eq!(controller.provider().stop_count(), 0);
        assert_eq!(controller.provider().start_count(), 0);
    }

    #[test]
    fn test_reject_policy_surfaces_error() {
        let config = ControllerConfig {
            time_delta_policy: TimeDeltaPolicy::Reject,
            ..ControllerConfig::default()
        };
        let mut controller = TrackingController::new(MockProvider::new(), RecordingDisplay::new(), config);
        controller.toggle().unwrap();
        controller.handle_fix(Fix::new(0.0, 0.0, 10.0)).unwrap();

        let result = controller.handle_fix(Fix::new(0.0, 0.0, 10.0));
        assert_eq!(result, Err(ApiError::Speed(SpeedError::DegenerateTimeDelta { dt_s: 0.0 })));
        assert_eq!(controller.stats().fixes_rejected, 1);

        // pump logs and keeps going
        controller.provider().deliver_all(vec![Fix::new(0.0, 0.0, 9.0), Fix::new(0.0, 0.0, 12.0)]);
        assert_eq!(controller.pump(), 2);
        assert_eq!(controller.stats().fixes_rejected, 2);
        assert_eq!(controller.stats().readings_produced, 1);
    }
}
