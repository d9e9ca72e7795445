//! Core data types for speed tracking

use crate::core::constants::{
    DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL_MS, START_TRACKING_LABEL, STOP_TRACKING_LABEL,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position report from a location provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Arrival time in seconds since the Unix epoch
    pub timestamp: f64,
    /// Altitude above the ellipsoid (m), if the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    /// Horizontal accuracy radius (m), if the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, timestamp: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            altitude_m: None,
            accuracy_m: None,
        }
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Great-circle distance to another fix in metres
    pub fn distance_to(&self, other: &Fix) -> f64 {
        crate::algorithms::haversine::distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Speed derived from two consecutive fixes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedReading {
    pub kilometers_per_hour: f64,
    /// Distance covered between the two fixes (m)
    pub distance_m: f64,
    /// Time between the two fixes (s)
    pub elapsed_s: f64,
    /// Timestamp of the fix that completed the reading
    pub timestamp: f64,
}

impl SpeedReading {
    /// Reading shown before any speed has been computed
    pub fn zero() -> Self {
        Self {
            kilometers_per_hour: 0.0,
            distance_m: 0.0,
            elapsed_s: 0.0,
            timestamp: 0.0,
        }
    }

    pub fn meters_per_second(&self) -> f64 {
        self.kilometers_per_hour / crate::core::constants::MPS_TO_KMH
    }
}

/// Subscription state of the tracking controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    Stopped,
    Tracking,
}

impl TrackingState {
    /// Label for the toggle control while in this state
    pub fn control_label(&self) -> &'static str {
        match self {
            TrackingState::Stopped => START_TRACKING_LABEL,
            TrackingState::Tracking => STOP_TRACKING_LABEL,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingState::Stopped => write!(f, "stopped"),
            TrackingState::Tracking => write!(f, "tracking"),
        }
    }
}

/// Provider-side thresholds suppressing redundant fixes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateThresholds {
    /// Minimum time between updates (ms)
    pub min_interval_ms: u64,
    /// Minimum movement between updates (m)
    pub min_distance_m: f64,
}

impl Default for UpdateThresholds {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }
}
