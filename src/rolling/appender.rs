use crate::appender::{BoxedWriter, FileAppender, Layout, LogEvent};
use crate::rolling::{
    Action, ActionHandle, CountingSink, FileLength, FixedWindowRollingPolicy,
    ManualTriggeringPolicy, RollingError, RollingPolicy, RolloverPlan, TriggeringPolicy,
};
use log::{debug, warn};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Backups kept by the fixed-window policy installed when none is configured
pub const DEFAULT_MAX_BACKUP_INDEX: u32 = 1;

/// Everything the rotation critical section touches
struct RollingState {
    file: FileAppender,
    /// At most one background action is outstanding at a time
    in_flight: Option<ActionHandle>,
    closed: bool,
}

/// File appender that rotates its output according to a triggering policy
/// (when) and a rolling policy (how).
///
/// The trigger check runs outside the state lock on every append; rotation
/// itself is serialized by the lock. Two threads can therefore both see a
/// rotation as due and rotate one after the other. The second asks the
/// rolling policy again and may rotate a second time.
pub struct RollingFileAppender {
    name: String,
    state: Mutex<RollingState>,
    /// Mirror of the active file name readable without the state lock
    active_file: RwLock<PathBuf>,
    file_length: Arc<FileLength>,
    triggering_policy: Option<Arc<dyn TriggeringPolicy>>,
    rolling_policy: Option<Arc<dyn RollingPolicy>>,
    max_backup_index: u32,
    activated: bool,
}

impl RollingFileAppender {
    pub fn new(file: impl Into<PathBuf>, layout: Arc<dyn Layout>) -> Self {
        let file = file.into();
        let file_length = Arc::new(FileLength::default());
        let mut appender = FileAppender::new(file.clone(), layout);
        let counter = Arc::clone(&file_length);
        appender.set_sink_wrapper(Box::new(move |sink: File| -> BoxedWriter {
            Box::new(CountingSink::new(sink, Arc::clone(&counter)))
        }));

        Self {
            name: file.display().to_string(),
            state: Mutex::new(RollingState {
                file: appender,
                in_flight: None,
                closed: false,
            }),
            active_file: RwLock::new(file),
            file_length,
            triggering_policy: None,
            rolling_policy: None,
            max_backup_index: DEFAULT_MAX_BACKUP_INDEX,
            activated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    fn state_mut(&mut self) -> &mut RollingState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, RollingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_active_file(&self, file: &Path) {
        let mut active = self.active_file.write().unwrap_or_else(PoisonError::into_inner);
        *active = file.to_path_buf();
    }

    pub fn set_file(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        self.state_mut().file.set_file_name(file.clone());
        *self.active_file.get_mut().unwrap_or_else(PoisonError::into_inner) = file;
    }

    pub fn set_append(&mut self, append: bool) {
        self.state_mut().file.set_append(append);
    }

    pub fn append_mode(&self) -> bool {
        self.lock_state().file.is_append()
    }

    pub fn set_buffered_io(&mut self, buffered_io: bool) {
        self.state_mut().file.set_buffered_io(buffered_io);
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.state_mut().file.set_buffer_size(buffer_size);
    }

    /// Backups kept by the default fixed-window policy
    pub fn set_max_backup_index(&mut self, max_backup_index: u32) {
        self.max_backup_index = max_backup_index;
    }

    pub fn max_backup_index(&self) -> u32 {
        self.max_backup_index
    }

    pub fn set_rolling_policy(&mut self, policy: Arc<dyn RollingPolicy>) {
        self.rolling_policy = Some(policy);
    }

    pub fn set_triggering_policy(&mut self, policy: Arc<dyn TriggeringPolicy>) {
        self.triggering_policy = Some(policy);
    }

    pub fn rolling_policy(&self) -> Option<&Arc<dyn RollingPolicy>> {
        self.rolling_policy.as_ref()
    }

    pub fn triggering_policy(&self) -> Option<&Arc<dyn TriggeringPolicy>> {
        self.triggering_policy.as_ref()
    }

    /// Set an option by its case-insensitive name
    pub fn set_option(&mut self, option: &str, value: &str) -> Result<(), RollingError> {
        let name = option.to_ascii_lowercase();
        match name.as_str() {
            "file" => self.set_file(value.trim()),
            "append" => self.set_append(parse_bool(option, value)?),
            "bufferedio" => self.set_buffered_io(parse_bool(option, value)?),
            "buffersize" => self.set_buffer_size(
                value
                    .trim()
                    .parse()
                    .map_err(|_| RollingError::invalid_option(option, value))?,
            ),
            "maxbackupindex" => self.set_max_backup_index(
                value
                    .trim()
                    .parse()
                    .map_err(|_| RollingError::invalid_option(option, value))?,
            ),
            _ => return Err(RollingError::UnknownOption(option.to_string())),
        }
        Ok(())
    }

    /// Path of the file currently receiving writes
    pub fn active_file(&self) -> PathBuf {
        self.active_file
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Estimated byte length of the active file
    pub fn file_length(&self) -> u64 {
        self.file_length.get()
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Wire the policies, apply the rolling policy's startup plan and open
    /// the active file. Returns whether rotation is enabled.
    ///
    /// Calling it again after a first activation does nothing. On failure a
    /// warning is logged, rotation stays disabled and the configured file is
    /// opened directly so logging keeps working.
    pub fn activate(&mut self) -> bool {
        if self.activated {
            return self.rolling_policy.is_some();
        }
        self.activated = true;

        match self.try_activate() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "Exception while initializing rolling file appender named {}: {err}",
                    self.name
                );
                self.rolling_policy = None;
                self.triggering_policy = None;
                let name = self.name.clone();
                let state = self.state_mut();
                if !state.file.has_writer() {
                    if let Err(err) = state.file.activate() {
                        warn!("Appender {name} could not open {}: {err}", state.file.file().display());
                    }
                }
                false
            }
        }
    }

    fn try_activate(&mut self) -> Result<(), RollingError> {
        let max_backup_index = self.max_backup_index;
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);

        let rolling: Arc<dyn RollingPolicy> = match &self.rolling_policy {
            Some(policy) => Arc::clone(policy),
            None => Arc::new(FixedWindowRollingPolicy::for_file(
                state.file.file(),
                max_backup_index,
            )?),
        };
        // a rolling policy that can also trigger doubles as the trigger
        let triggering: Arc<dyn TriggeringPolicy> = match &self.triggering_policy {
            Some(policy) => Arc::clone(policy),
            None => match Arc::clone(&rolling).as_triggering_policy() {
                Some(policy) => policy,
                None => Arc::new(ManualTriggeringPolicy),
            },
        };

        triggering.activate()?;
        rolling.activate()?;

        let current = state.file.file().to_path_buf();
        if let Some(plan) = rolling.initialize(&current, state.file.is_append())? {
            let RolloverPlan {
                active_file,
                append,
                synchronous,
                asynchronous,
            } = plan;
            if let Some(action) = synchronous {
                action.execute()?;
            }
            state.file.set_file_name(active_file);
            state.file.set_append(append);
            Self::dispatch(&self.name, state, asynchronous);
        }

        let active_file = state.file.file().to_path_buf();
        self.file_length
            .set(Self::measure(&active_file, state.file.is_append()));
        state.file.activate()?;

        *self.active_file.get_mut().unwrap_or_else(PoisonError::into_inner) = active_file;
        self.rolling_policy = Some(rolling);
        self.triggering_policy = Some(triggering);
        Ok(())
    }

    /// Consult the triggering policy. Side-effect free; must run before the
    /// event's bytes are written.
    pub fn is_rotation_due(&self, event: &LogEvent) -> bool {
        let Some(policy) = &self.triggering_policy else {
            return false;
        };
        let active_file = self.active_file.read().unwrap_or_else(PoisonError::into_inner);
        policy.is_triggering_event(event, &active_file, self.file_length.get())
    }

    /// Rotate the active file now. Returns whether a rotation happened;
    /// failures are logged, never returned.
    pub fn rotate(&self) -> bool {
        let Some(policy) = &self.rolling_policy else {
            return false;
        };

        let mut state = self.lock_state();
        if state.closed {
            return false;
        }
        match self.rollover(&mut state, policy.as_ref()) {
            Ok(rotated) => rotated,
            Err(err) => {
                warn!(
                    "Exception during rollover of {} in appender {}: {err}",
                    state.file.file().display(),
                    self.name
                );
                false
            }
        }
    }

    fn rollover(&self, state: &mut RollingState, policy: &dyn RollingPolicy) -> Result<bool, RollingError> {
        if let Some(mut previous) = state.in_flight.take() {
            previous.close();
        }

        let current = state.file.file().to_path_buf();
        let Some(plan) = policy.rollover(&current)? else {
            debug!("Rolling policy had nothing to do for {}", current.display());
            return Ok(false);
        };
        let RolloverPlan {
            active_file,
            append,
            synchronous,
            asynchronous,
        } = plan;

        if active_file == current {
            state.file.close_writer();
            let success = self.run_synchronous(synchronous.as_deref(), &active_file);
            if success {
                self.file_length.set(Self::measure(&active_file, append));
                Self::dispatch(&self.name, state, asynchronous);
                state.file.set_file(&active_file, append)?;
            } else {
                // keep what is already on disk
                state.file.set_file(&active_file, true)?;
            }
        } else {
            let sink = FileAppender::open_sink(&active_file, append)?;
            let writer = state.file.create_writer(sink);
            state.file.close_writer();
            state.file.set_file_name(active_file.clone());
            state.file.set_append(append);
            state.file.set_writer(writer);
            self.publish_active_file(&active_file);

            if self.run_synchronous(synchronous.as_deref(), &active_file) {
                self.file_length.set(Self::measure(&active_file, append));
                Self::dispatch(&self.name, state, asynchronous);
            }
            state.file.write_header()?;
        }

        debug!("Rolled over {} to {}", current.display(), active_file.display());
        Ok(true)
    }

    fn run_synchronous(&self, action: Option<&dyn Action>, active_file: &Path) -> bool {
        let Some(action) = action else {
            return true;
        };
        match action.execute() {
            Ok(done) => {
                if !done {
                    debug!("Rollover action {action:?} reported no work for {}", active_file.display());
                }
                done
            }
            Err(err) => {
                warn!(
                    "Exception on rollover of {} in appender {}: {err}",
                    active_file.display(),
                    self.name
                );
                false
            }
        }
    }

    fn dispatch(name: &str, state: &mut RollingState, action: Option<Box<dyn Action>>) {
        let Some(action) = action else {
            return;
        };
        let description = format!("{action:?}");
        match ActionHandle::spawn(action) {
            Ok(handle) => state.in_flight = Some(handle),
            Err(err) => warn!(
                "Appender {name} could not start background action {description}: {err}"
            ),
        }
    }

    fn measure(file: &Path, append: bool) -> u64 {
        if !append {
            return 0;
        }
        fs::metadata(file).map(|meta| meta.len()).unwrap_or(0)
    }

    /// Write one event, rotating first when the triggering policy asks for it.
    /// Rotation failures are logged and the event is written regardless.
    pub fn append(&self, event: &LogEvent) -> Result<(), RollingError> {
        if self.is_rotation_due(event) {
            self.rotate();
        }

        let mut state = self.lock_state();
        if state.closed {
            return Err(RollingError::Closed);
        }
        state.file.write_event(event)
    }

    /// Wait for outstanding background work, then close the active file.
    /// No write is accepted afterwards.
    pub fn shutdown(&self) {
        let mut state = self.lock_state();
        if state.closed {
            return;
        }
        if let Some(mut action) = state.in_flight.take() {
            action.close();
        }
        state.file.close();
        state.closed = true;
    }
}

impl Drop for RollingFileAppender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn parse_bool(option: &str, value: &str) -> Result<bool, RollingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RollingError::invalid_option(option, value)),
    }
}
