//! Mock location provider for testing and development

use crate::core::{Fix, UpdateThresholds};
use crate::hardware::{FixHandler, LocationProvider, ProviderError, ProviderResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Scripted location provider
///
/// Records every `start`/`stop` call and hands fixes to the registered
/// handler on demand.
#[derive(Default)]
pub struct MockProvider {
    handler: Option<FixHandler>,
    running: bool,
    start_calls: Vec<UpdateThresholds>,
    stop_calls: Arc<AtomicU32>,
    permission_denied: bool,
    next_start_error: Option<ProviderError>,
    next_stop_error: Option<ProviderError>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thresholds passed to each `start` call, in order
    pub fn start_calls(&self) -> &[UpdateThresholds] {
        &self.start_calls
    }

    pub fn start_count(&self) -> usize {
        self.start_calls.len()
    }

    pub fn stop_count(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Handle on the stop counter that stays readable after the provider is dropped
    pub fn stop_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.stop_calls)
    }

    pub fn is_configured(&self) -> bool {
        self.handler.is_some()
    }

    /// Make every subsequent `start` fail as if the user denied access
    pub fn deny_permission(&mut self, denied: bool) {
        self.permission_denied = denied;
    }

    /// Fail the next `start` with `error`
    pub fn fail_next_start(&mut self, error: ProviderError) {
        self.next_start_error = Some(error);
    }

    /// Fail the next `stop` with `error`
    pub fn fail_next_stop(&mut self, error: ProviderError) {
        self.next_stop_error = Some(error);
    }

    /// Deliver a fix to the handler; returns false if nothing received it
    pub fn deliver(&self, fix: Fix) -> bool {
        if !self.running {
            return false;
        }
        match &self.handler {
            Some(handler) => {
                handler(fix);
                true
            }
            None => false,
        }
    }

    /// Deliver a sequence of fixes, returning how many were received
    pub fn deliver_all<I: IntoIterator<Item = Fix>>(&self, fixes: I) -> usize {
        fixes.into_iter().filter(|fix| self.deliver(*fix)).count()
    }
}

impl LocationProvider for MockProvider {
    fn configure(&mut self, handler: FixHandler) {
        self.handler = Some(handler);
    }

    fn start(&mut self, thresholds: &UpdateThresholds) -> ProviderResult<()> {
        self.start_calls.push(*thresholds);

        if self.permission_denied {
            return Err(ProviderError::PermissionDenied);
        }
        if let Some(error) = self.next_start_error.take() {
            return Err(error);
        }
        if self.handler.is_none() {
            return Err(ProviderError::NotConfigured);
        }
        if self.running {
            return Err(ProviderError::AlreadyRunning);
        }

        debug!(
            min_interval_ms = thresholds.min_interval_ms,
            min_distance_m = thresholds.min_distance_m,
            "mock provider started"
        );
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> ProviderResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        if !self.running {
            return Err(ProviderError::NotRunning);
        }
        self.running = false;

        if let Some(error) = self.next_stop_error.take() {
            return Err(error);
        }
        debug!("mock provider stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn name(&self) -> &str {
        "mock"
    }
}
