//! Speed reading output formatting
//!
//! Text output is what a person watching the speedometer reads; JSON output
//! emits one self-describing object per line for other programs.

use crate::core::SpeedReading;
use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// "Speed: 12.34 km/h" lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Something the display renders, in serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum DisplayEvent {
    Speed {
        kilometers_per_hour: f64,
        distance_m: f64,
        elapsed_s: f64,
        timestamp: f64,
    },
    Control {
        label: String,
    },
}

impl From<&SpeedReading> for DisplayEvent {
    fn from(reading: &SpeedReading) -> Self {
        DisplayEvent::Speed {
            kilometers_per_hour: reading.kilometers_per_hour,
            distance_m: reading.distance_m,
            elapsed_s: reading.elapsed_s,
            timestamp: reading.timestamp,
        }
    }
}

/// Format a reading the way the speed label shows it
pub fn format_speed(reading: &SpeedReading) -> String {
    TextFormatter::default().format_speed(reading)
}

/// Human-readable formatter
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// Decimal places shown for the speed
    pub precision: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format_speed(&self, reading: &SpeedReading) -> String {
        format!("Speed: {:.*} km/h", self.precision, reading.kilometers_per_hour)
    }

    pub fn format_label(&self, label: &str) -> String {
        format!("[{}]", label)
    }
}

/// JSON formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format_json(&self, event: &DisplayEvent) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(event)
        } else {
            serde_json::to_string(event)
        }
    }
}
