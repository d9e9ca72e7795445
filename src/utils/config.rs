use crate::algorithms::speed::TimeDeltaPolicy;
use crate::api::formatting::OutputFormat;
use crate::api::types::ControllerConfig;
use crate::core::constants::{
    DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL_MS, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};
use crate::core::UpdateThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::Level;

/// Application configuration; every field may be omitted from the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Minimum time between location updates (milliseconds)
    pub min_update_interval_ms: u64,
    /// Minimum movement between location updates (meters)
    pub min_update_distance_m: f64,
    /// Handling of duplicate or out-of-order fixes
    pub time_delta_policy: TimeDeltaPolicy,
    /// Display output format
    pub output_format: OutputFormat,
    /// Log verbosity: error, warn, info, debug or trace
    pub log_level: String,
    /// Replay speed multiplier for recorded tracks
    pub playback_rate: f64,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_update_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            min_update_distance_m: DEFAULT_MIN_DISTANCE_M,
            time_delta_policy: TimeDeltaPolicy::Skip,
            output_format: OutputFormat::Text,
            log_level: "info".to_string(),
            playback_rate: 1.0,
        }
    }
}

impl AppConfig {
    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json).map_err(|e| ConfigError::Serialization {
            message: format!("Failed to parse config: {}", e),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("Failed to read config file '{}'", path_str),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Write configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: "Failed to serialize config".to_string(),
            source: e,
        })?;
        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("Failed to write config file '{}'", path_str),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_update_interval_ms == 0 {
            return Err(invalid(
                "min_update_interval_ms",
                self.min_update_interval_ms,
                "must be greater than zero",
            ));
        }
        if !self.min_update_distance_m.is_finite() || self.min_update_distance_m < 0.0 {
            return Err(invalid(
                "min_update_distance_m",
                self.min_update_distance_m,
                "must be a finite, non-negative distance",
            ));
        }
        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&self.playback_rate) {
            return Err(invalid(
                "playback_rate",
                self.playback_rate,
                &format!("must be between {} and {}", MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE),
            ));
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn tracing_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| invalid("log_level", &self.log_level, "expected error, warn, info, debug or trace"))
    }

    pub fn thresholds(&self) -> UpdateThresholds {
        UpdateThresholds {
            min_interval_ms: self.min_update_interval_ms,
            min_distance_m: self.min_update_distance_m,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            thresholds: self.thresholds(),
            time_delta_policy: self.time_delta_policy,
        }
    }
}

fn invalid<V: ToString>(parameter: &str, value: V, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
