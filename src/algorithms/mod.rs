//! Distance and speed algorithms

pub mod haversine;
pub mod speed;

pub use haversine::distance;
pub use speed::{SpeedEstimator, SpeedError, SpeedResult, TimeDeltaPolicy};
