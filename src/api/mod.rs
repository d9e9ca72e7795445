//! Tracking control and presentation
//!
//! The controller owns the provider subscription and the speed estimator,
//! and pushes what it computes to a display.

pub mod controller;
pub mod display;
pub mod formatting;
pub mod types;

pub use controller::TrackingController;
pub use display::{RecordingDisplay, SpeedDisplay, TerminalDisplay};
pub use formatting::{format_speed, DisplayEvent, JsonFormatter, OutputFormat, TextFormatter};
pub use types::{ApiError, ApiResult, ControllerConfig, TrackingStats};
