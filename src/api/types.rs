//! Common API types and data structures

use crate::algorithms::speed::{SpeedError, TimeDeltaPolicy};
use crate::core::{SpeedReading, UpdateThresholds};
use crate::hardware::ProviderError;
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The location provider refused or failed a subscription change
    #[error("location provider error: {0}")]
    Provider(#[from] ProviderError),
    /// A fix could not be turned into a speed reading
    #[error("speed estimation error: {0}")]
    Speed(#[from] SpeedError),
}

/// Tracking controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerConfig {
    /// Thresholds requested from the provider on start
    pub thresholds: UpdateThresholds,
    /// Handling of duplicate or out-of-order fixes
    pub time_delta_policy: TimeDeltaPolicy,
}

/// Counters describing the current session, cleared each time tracking starts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingStats {
    pub fixes_received: u64,
    pub readings_produced: u64,
    pub fixes_rejected: u64,
    pub last_reading: Option<SpeedReading>,
}

impl TrackingStats {
    pub fn record_reading(&mut self, reading: SpeedReading) {
        self.readings_produced += 1;
        self.last_reading = Some(reading);
    }
}
