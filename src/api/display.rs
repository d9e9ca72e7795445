//! Speed label and toggle control rendering

use crate::api::formatting::{DisplayEvent, JsonFormatter, OutputFormat, TextFormatter};
use crate::core::SpeedReading;
use std::io::Write;
use tracing::warn;

/// Presentation surface for the speedometer
pub trait SpeedDisplay {
    /// Render the latest speed reading
    fn show_speed(&mut self, reading: &SpeedReading);

    /// Set the text of the tracking toggle control
    fn show_control_label(&mut self, text: &str);
}

/// Line-oriented display writing to a terminal or any other writer
pub struct TerminalDisplay<W: Write> {
    writer: W,
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            text: TextFormatter::new(),
            json: JsonFormatter::new(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn json_line(&self, event: &DisplayEvent) -> Option<String> {
        match self.json.format_json(event) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("Failed to serialize display event: {}", e);
                None
            }
        }
    }

    fn write_line(&mut self, line: Option<String>) {
        let line = match line {
            Some(line) => line,
            None => return,
        };
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            warn!("Failed to write to display: {}", e);
        }
    }
}

impl<W: Write> SpeedDisplay for TerminalDisplay<W> {
    fn show_speed(&mut self, reading: &SpeedReading) {
        let line = match self.format {
            OutputFormat::Text => Some(self.text.format_speed(reading)),
            OutputFormat::Json => self.json_line(&DisplayEvent::from(reading)),
        };
        self.write_line(line);
    }

    fn show_control_label(&mut self, text: &str) {
        let line = match self.format {
            OutputFormat::Text => Some(self.text.format_label(text)),
            OutputFormat::Json => self.json_line(&DisplayEvent::Control {
                label: text.to_string(),
            }),
        };
        self.write_line(line);
    }
}

/// Display that keeps what it was asked to show, for tests and headless use
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub readings: Vec<SpeedReading>,
    pub labels: Vec<String>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_reading(&self) -> Option<&SpeedReading> {
        self.readings.last()
    }

    pub fn current_label(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }
}

impl SpeedDisplay for RecordingDisplay {
    fn show_speed(&mut self, reading: &SpeedReading) {
        self.readings.push(*reading);
    }

    fn show_control_label(&mut self, text: &str) {
        self.labels.push(text.to_string());
    }
}
