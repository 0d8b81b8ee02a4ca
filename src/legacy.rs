use crate::appender::{Layout, LogEvent};
use crate::rolling::{
    parse_file_size, FileNamePattern, FixedWindowRollingPolicy, RollingError, RollingFileAppender,
    SizeBasedTriggeringPolicy, DEFAULT_MAX_FILE_SIZE,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Size-capped appender configured through `MaxFileSize` and
/// `MaxBackupIndex`, translated onto a size trigger and a fixed window
pub struct SizeRollingFileAppender {
    inner: RollingFileAppender,
    file: PathBuf,
    max_file_size: u64,
    max_backup_index: u32,
}

impl SizeRollingFileAppender {
    pub fn new(file: impl Into<PathBuf>, layout: Arc<dyn Layout>) -> Self {
        let file = file.into();
        Self {
            inner: RollingFileAppender::new(file.clone(), layout),
            file,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backup_index: 1,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn set_maximum_file_size(&mut self, max_file_size: u64) {
        self.max_file_size = max_file_size;
    }

    /// Accepts plain byte counts or `KB`/`MB`/`GB` suffixed sizes
    pub fn set_max_file_size(&mut self, value: &str) -> Result<(), RollingError> {
        self.max_file_size =
            parse_file_size(value).ok_or_else(|| RollingError::invalid_option("MaxFileSize", value))?;
        Ok(())
    }

    pub fn max_backup_index(&self) -> u32 {
        self.max_backup_index
    }

    pub fn set_max_backup_index(&mut self, max_backup_index: u32) {
        self.max_backup_index = max_backup_index;
    }

    /// Handles the two size options, forwards everything else
    pub fn set_option(&mut self, option: &str, value: &str) -> Result<(), RollingError> {
        if option.eq_ignore_ascii_case("MaxFileSize") || option.eq_ignore_ascii_case("MaximumFileSize") {
            return self.set_max_file_size(value);
        }
        if option.eq_ignore_ascii_case("MaxBackupIndex") || option.eq_ignore_ascii_case("MaximumBackupIndex") {
            self.max_backup_index = value
                .trim()
                .parse()
                .map_err(|_| RollingError::invalid_option(option, value))?;
            return Ok(());
        }
        if option.eq_ignore_ascii_case("File") {
            self.file = PathBuf::from(value.trim());
        }
        self.inner.set_option(option, value)
    }

    /// Install the size trigger and window, then activate. Policies are
    /// fixed from the first call on; later calls change nothing.
    pub fn activate(&mut self) -> bool {
        if self.inner.is_active() {
            return self.inner.activate();
        }
        self.inner
            .set_triggering_policy(Arc::new(SizeBasedTriggeringPolicy::new(self.max_file_size)));
        // an unusable file name is reported by the inner activation
        if let Ok(pattern) = FileNamePattern::for_file(&self.file) {
            self.inner.set_rolling_policy(Arc::new(FixedWindowRollingPolicy::new(
                1,
                self.max_backup_index,
                pattern,
            )));
        }
        self.inner.activate()
    }

    pub fn append(&self, event: &LogEvent) -> Result<(), RollingError> {
        self.inner.append(event)
    }

    /// Force a rotation regardless of the current size
    pub fn roll_over(&self) -> bool {
        self.inner.rotate()
    }

    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn inner(&self) -> &RollingFileAppender {
        &self.inner
    }
}
