//! Instantaneous speed from consecutive fixes

use crate::core::constants::MPS_TO_KMH;
use crate::core::{Fix, SpeedReading};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Result type for speed estimation
pub type SpeedResult<T> = Result<T, SpeedError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeedError {
    /// Fix arrived with the same or an earlier timestamp than the previous one
    #[error("non-positive time delta between fixes: {dt_s} s")]
    DegenerateTimeDelta { dt_s: f64 },
}

/// What to do when two fixes are not strictly ordered in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDeltaPolicy {
    /// Drop the fix without producing a reading
    #[default]
    Skip,
    /// Report the fix as an error
    Reject,
}

/// Speed estimator keeping the last seen fix
///
/// Degenerate fixes (duplicate or out-of-order timestamps) never replace the
/// stored fix, so a single stray report cannot corrupt the next reading.
#[derive(Debug, Clone, Default)]
pub struct SpeedEstimator {
    previous_fix: Option<Fix>,
    policy: TimeDeltaPolicy,
}

impl SpeedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TimeDeltaPolicy) -> Self {
        Self {
            previous_fix: None,
            policy,
        }
    }

    pub fn policy(&self) -> TimeDeltaPolicy {
        self.policy
    }

    pub fn previous_fix(&self) -> Option<&Fix> {
        self.previous_fix.as_ref()
    }

    /// Forget the stored fix; the next fix only primes the estimator
    pub fn reset(&mut self) {
        self.previous_fix = None;
    }

    /// Feed a new fix and compute the speed since the previous one
    pub fn on_fix(&mut self, fix: Fix) -> SpeedResult<Option<SpeedReading>> {
        let previous = match self.previous_fix {
            Some(previous) => previous,
            None => {
                debug!(lat = fix.latitude, lon = fix.longitude, "first fix stored");
                self.previous_fix = Some(fix);
                return Ok(None);
            }
        };

        let dt_s = fix.timestamp - previous.timestamp;
        if dt_s <= 0.0 || !dt_s.is_finite() {
            return match self.policy {
                TimeDeltaPolicy::Skip => {
                    warn!(dt_s, "skipping fix with non-positive time delta");
                    Ok(None)
                }
                TimeDeltaPolicy::Reject => Err(SpeedError::DegenerateTimeDelta { dt_s }),
            };
        }

        let distance_m = previous.distance_to(&fix);
        let kilometers_per_hour = (distance_m / dt_s) * MPS_TO_KMH;
        self.previous_fix = Some(fix);

        debug!(distance_m, dt_s, kilometers_per_hour, "speed computed");
        Ok(Some(SpeedReading {
            kilometers_per_hour,
            distance_m,
            elapsed_s: dt_s,
            timestamp: fix.timestamp,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::haversine::distance;

    #[test]
    fn test_first_fix_produces_no_reading() {
        let mut estimator = SpeedEstimator::new();
        let fix = Fix::new(47.6062, -122.3321, 100.0);

        assert_eq!(estimator.on_fix(fix), Ok(None));
        assert_eq!(estimator.previous_fix(), Some(&fix));
    }

    #[test]
    fn test_speed_between_two_fixes() {
        let mut estimator = SpeedEstimator::new();
        estimator.on_fix(Fix::new(0.0, 0.0, 0.0)).unwrap();

        let reading = estimator.on_fix(Fix::new(0.0, 0.001, 10.0)).unwrap().unwrap();
        let expected = distance(0.0, 0.0, 0.0, 0.001) / 10.0 * 3.6;

        assert!((reading.kilometers_per_hour - expected).abs() < 1e-9);
        assert_eq!(reading.elapsed_s, 10.0);
        assert_eq!(reading.timestamp, 10.0);
        // 0.001 deg of longitude at the equator is about 111 m
        assert!((reading.distance_m - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_identical_positions_yield_zero_speed() {
        let mut estimator = SpeedEstimator::new();
        estimator.on_fix(Fix::new(10.0, 20.0, 1.0)).unwrap();

        let reading = estimator.on_fix(Fix::new(10.0, 20.0, 2.0)).unwrap().unwrap();
        assert_eq!(reading.kilometers_per_hour, 0.0);
    }

    #[test]
    fn test_previous_fix_replaced_after_reading() {
        let mut estimator = SpeedEstimator::new();
        estimator.on_fix(Fix::new(0.0, 0.0, 0.0)).unwrap();
        let second = Fix::new(0.0, 0.001, 5.0);
        estimator.on_fix(second).unwrap();

        assert_eq!(estimator.previous_fix(), Some(&second));
    }

    #[test]
    fn test_duplicate_timestamp_is_skipped() {
        let mut estimator = SpeedEstimator::new();
        let first = Fix::new(0.0, 0.0, 5.0);
        estimator.on_fix(first).unwrap();

        assert_eq!(estimator.on_fix(Fix::new(0.0, 0.001, 5.0)), Ok(None));
        assert_eq!(estimator.previous_fix(), Some(&first));
    }

    #[test]
    fn test_out_of_order_fix_is_skipped() {
        let mut estimator = SpeedEstimator::new();
        estimator.on_fix(Fix::new(0.0, 0.0, 5.0)).unwrap();

        assert_eq!(estimator.on_fix(Fix::new(0.0, 0.001, 3.0)), Ok(None));

        // the next well-ordered fix is measured against the first one
        let reading = estimator.on_fix(Fix::new(0.0, 0.0, 7.0)).unwrap().unwrap();
        assert_eq!(reading.elapsed_s, 2.0);
        assert_eq!(reading.kilometers_per_hour, 0.0);
    }

    #[test]
    fn test_reject_policy_reports_degenerate_delta() {
        let mut estimator = SpeedEstimator::with_policy(TimeDeltaPolicy::Reject);
        estimator.on_fix(Fix::new(0.0, 0.0, 5.0)).unwrap();

        let result = estimator.on_fix(Fix::new(0.0, 0.0, 4.0));
        assert_eq!(result, Err(SpeedError::DegenerateTimeDelta { dt_s: -1.0 }));
        assert_eq!(estimator.previous_fix().map(|f| f.timestamp), Some(5.0));
    }

    #[test]
    fn test_reset_clears_previous_fix() {
        let mut estimator = SpeedEstimator::new();
        estimator.on_fix(Fix::new(0.0, 0.0, 0.0)).unwrap();
        estimator.reset();

        assert!(estimator.previous_fix().is_none());
        assert_eq!(estimator.on_fix(Fix::new(0.0, 0.001, 10.0)), Ok(None));
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: TimeDeltaPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, TimeDeltaPolicy::Reject);
    }
}
