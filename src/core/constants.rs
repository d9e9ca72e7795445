//! Physical constants and default tracking parameters

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion factor from metres per second to kilometres per hour
pub const MPS_TO_KMH: f64 = 3.6;

/// Default minimum time between provider updates (ms)
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

/// Default minimum movement between provider updates (m)
pub const DEFAULT_MIN_DISTANCE_M: f64 = 1.0;

/// Control label shown while tracking is stopped
pub const START_TRACKING_LABEL: &str = "Start Tracking";

/// Control label shown while tracking is active
pub const STOP_TRACKING_LABEL: &str = "Stop Tracking";

/// Slowest accepted replay speed multiplier
pub const MIN_PLAYBACK_RATE: f64 = 1e-3;

/// Fastest accepted replay speed multiplier
pub const MAX_PLAYBACK_RATE: f64 = 1e6;
