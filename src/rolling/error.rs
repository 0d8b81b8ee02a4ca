use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the rotation engine and its collaborators
#[derive(Error, Debug)]
pub enum RollingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file name pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
    #[error("Invalid value {value:?} for option {name}")]
    InvalidOption { name: String, value: String },
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Appender is closed")]
    Closed,
    #[error("No output stream or file set for {0}")]
    NoWriter(PathBuf),
    #[error("Policy error: {0}")]
    Policy(String),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RollingError {
    pub(crate) fn invalid_option(name: &str, value: &str) -> Self {
        RollingError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
