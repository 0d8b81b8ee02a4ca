use crate::appender::LogEvent;
use log::warn;

/// Turns events into the bytes written to the active file
pub trait Layout: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;

    /// Written every time a file is (re)opened
    fn header(&self) -> Option<String> {
        None
    }

    /// Written before a file is closed
    fn footer(&self) -> Option<String> {
        None
    }
}

/// `LEVEL - message`, one event per line
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleLayout;

impl Layout for SimpleLayout {
    fn format(&self, event: &LogEvent) -> String {
        format!("{} - {}\n", event.level, event.message)
    }
}

/// One JSON object per line
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLayout;

impl Layout for JsonLayout {
    fn format(&self, event: &LogEvent) -> String {
        match serde_json::to_string(event) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(err) => {
                warn!("Could not serialize log event: {err}");
                format!("{} - {}\n", event.level, event.message)
            }
        }
    }
}
