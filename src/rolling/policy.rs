use crate::appender::LogEvent;
use crate::rolling::{RollingError, RolloverPlan};
use std::path::Path;
use std::sync::Arc;

/// Decides, per event, whether the active file must be rotated now
pub trait TriggeringPolicy: Send + Sync {
    fn activate(&self) -> Result<(), RollingError> {
        Ok(())
    }

    /// Called before the event is written, with the current length estimate
    fn is_triggering_event(&self, event: &LogEvent, active_file: &Path, file_length: u64) -> bool;
}

/// Decides how the active file is retired and what replaces it
pub trait RollingPolicy: Send + Sync {
    fn activate(&self) -> Result<(), RollingError> {
        Ok(())
    }

    /// Plan to apply once at startup, if any
    fn initialize(&self, active_file: &Path, append: bool) -> Result<Option<RolloverPlan>, RollingError>;

    /// Plan for one rotation. `None` means there is nothing to do.
    fn rollover(&self, active_file: &Path) -> Result<Option<RolloverPlan>, RollingError>;

    /// Policies that can also trigger return themselves here
    fn as_triggering_policy(self: Arc<Self>) -> Option<Arc<dyn TriggeringPolicy>> {
        None
    }
}

/// Never fires; rotation only happens through an explicit `rotate` call
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTriggeringPolicy;

impl TriggeringPolicy for ManualTriggeringPolicy {
    fn is_triggering_event(&self, _event: &LogEvent, _active_file: &Path, _file_length: u64) -> bool {
        false
    }
}
