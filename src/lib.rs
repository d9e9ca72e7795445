//! GPS Speedometer
//!
//! Live speed from periodic location fixes: great-circle distance between
//! consecutive fixes over the time between them, shown on a small display
//! with a control that switches location updates on and off.

pub mod core;
pub mod algorithms;
pub mod hardware;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{Fix, SpeedReading, TrackingState, UpdateThresholds, EARTH_RADIUS_M};
pub use crate::algorithms::{distance, SpeedEstimator, SpeedError, TimeDeltaPolicy};
pub use crate::hardware::{LocationProvider, FixHandler, MockProvider, ReplayProvider, ProviderError, ProviderResult};
pub use crate::api::{
    TrackingController, SpeedDisplay, TerminalDisplay, RecordingDisplay,
    ApiError, ApiResult, ControllerConfig, OutputFormat, format_speed
};
pub use crate::utils::{AppConfig, ConfigError};
