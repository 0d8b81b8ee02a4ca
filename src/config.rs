use crate::appender::{JsonLayout, Layout, SimpleLayout, DEFAULT_BUFFER_SIZE};
use crate::rolling::{
    parse_file_size, FileNamePattern, FixedWindowRollingPolicy, ManualTriggeringPolicy,
    RollingError, RollingFileAppender, SizeBasedTriggeringPolicy, DEFAULT_MAX_BACKUP_INDEX,
    DEFAULT_MAX_FILE_SIZE,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Simple,
    Json,
}

/// Either a byte count or a suffixed size such as `"10MB"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileSize {
    Bytes(u64),
    Text(String),
}

impl FileSize {
    pub fn to_bytes(&self) -> Result<u64, RollingError> {
        match self {
            FileSize::Bytes(bytes) => Ok(*bytes),
            FileSize::Text(text) => {
                parse_file_size(text).ok_or_else(|| RollingError::invalid_option("max_file_size", text))
            }
        }
    }
}

impl Default for FileSize {
    fn default() -> Self {
        FileSize::Bytes(DEFAULT_MAX_FILE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggeringConfig {
    Size {
        #[serde(default)]
        max_file_size: FileSize,
    },
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollingConfig {
    FixedWindow {
        #[serde(default = "default_min_index")]
        min_index: u32,
        #[serde(default = "default_max_index")]
        max_index: u32,
        #[serde(default)]
        file_name_pattern: Option<String>,
    },
}

/// Appender settings as read from a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct AppenderConfig {
    pub file: PathBuf,
    #[serde(default = "default_true")]
    pub append: bool,
    #[serde(default)]
    pub buffered_io: bool,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default)]
    pub layout: LayoutKind,
    #[serde(default = "default_max_backup_index")]
    pub max_backup_index: u32,
    #[serde(default)]
    pub triggering: Option<TriggeringConfig>,
    #[serde(default)]
    pub rolling: Option<RollingConfig>,
}

fn default_true() -> bool {
    true
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_max_backup_index() -> u32 {
    DEFAULT_MAX_BACKUP_INDEX
}

fn default_min_index() -> u32 {
    1
}

fn default_max_index() -> u32 {
    7
}

impl AppenderConfig {
    pub fn from_json(json: &str) -> Result<Self, RollingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RollingError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build an appender from these settings; it still has to be activated
    pub fn build(&self) -> Result<RollingFileAppender, RollingError> {
        let layout: Arc<dyn Layout> = match self.layout {
            LayoutKind::Simple => Arc::new(SimpleLayout),
            LayoutKind::Json => Arc::new(JsonLayout),
        };

        let mut appender = RollingFileAppender::new(self.file.clone(), layout);
        appender.set_append(self.append);
        appender.set_buffered_io(self.buffered_io);
        appender.set_buffer_size(self.buffer_size);
        appender.set_max_backup_index(self.max_backup_index);

        match &self.triggering {
            Some(TriggeringConfig::Size { max_file_size }) => appender.set_triggering_policy(
                Arc::new(SizeBasedTriggeringPolicy::new(max_file_size.to_bytes()?)),
            ),
            Some(TriggeringConfig::Manual) => {
                appender.set_triggering_policy(Arc::new(ManualTriggeringPolicy))
            }
            None => {}
        }

        if let Some(RollingConfig::FixedWindow {
            min_index,
            max_index,
            file_name_pattern,
        }) = &self.rolling
        {
            let pattern = match file_name_pattern {
                Some(pattern) => pattern.clone(),
                None => FileNamePattern::for_file(&self.file)?,
            };
            appender.set_rolling_policy(Arc::new(FixedWindowRollingPolicy::new(
                *min_index, *max_index, pattern,
            )));
        }

        Ok(appender)
    }
}
