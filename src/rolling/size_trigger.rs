use crate::appender::LogEvent;
use crate::rolling::TriggeringPolicy;
use std::path::Path;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Fires once the active file has reached `max_file_size` bytes
#[derive(Debug, Clone, Copy)]
pub struct SizeBasedTriggeringPolicy {
    max_file_size: u64,
}

impl SizeBasedTriggeringPolicy {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

impl Default for SizeBasedTriggeringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl TriggeringPolicy for SizeBasedTriggeringPolicy {
    fn is_triggering_event(&self, _event: &LogEvent, _active_file: &Path, file_length: u64) -> bool {
        file_length >= self.max_file_size
    }
}

/// Parse sizes such as `1024`, `512KB`, `10MB` or `1gb` into bytes
pub fn parse_file_size(value: &str) -> Option<u64> {
    let value = value.trim();
    let upper = value.to_ascii_uppercase();
    let (digits, multiplier) = if let Some(digits) = upper.strip_suffix("KB") {
        (digits, 1024)
    } else if let Some(digits) = upper.strip_suffix("MB") {
        (digits, 1024 * 1024)
    } else if let Some(digits) = upper.strip_suffix("GB") {
        (digits, 1024 * 1024 * 1024)
    } else {
        (upper.as_str(), 1)
    };
    digits.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}
