use crate::rolling::RollingError;
use log::{debug, warn};
use std::fmt::Debug;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Deferred unit of rollover work such as a rename or a compression
pub trait Action: Debug + Send + Sync {
    /// Perform the work. `Ok(false)` means nothing was done.
    fn execute(&self) -> Result<bool, RollingError>;
}

/// Rename `source` to `target`, replacing `target` if present
#[derive(Debug, Clone)]
pub struct FileRenameAction {
    source: PathBuf,
    target: PathBuf,
    rename_empty_files: bool,
}

impl FileRenameAction {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, rename_empty_files: bool) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rename_empty_files,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Action for FileRenameAction {
    fn execute(&self) -> Result<bool, RollingError> {
        let length = match fs::metadata(&self.source) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        // an empty file carries nothing worth keeping
        if length == 0 && !self.rename_empty_files {
            fs::remove_file(&self.source)?;
            return Ok(true);
        }

        if let Some(parent) = self.target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if self.target.exists() {
            fs::remove_file(&self.target)?;
        }
        fs::rename(&self.source, &self.target)?;
        debug!(
            "Renamed {} to {}",
            self.source.display(),
            self.target.display()
        );
        Ok(true)
    }
}

/// Delete a single file
#[derive(Debug, Clone)]
pub struct FileDeleteAction {
    path: PathBuf,
}

impl FileDeleteAction {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Action for FileDeleteAction {
    fn execute(&self) -> Result<bool, RollingError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Deleted {}", self.path.display());
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Runs a sequence of actions in order
#[derive(Debug)]
pub struct CompositeAction {
    actions: Vec<Box<dyn Action>>,
    stop_on_error: bool,
}

impl CompositeAction {
    pub fn new(actions: Vec<Box<dyn Action>>, stop_on_error: bool) -> Self {
        Self {
            actions,
            stop_on_error,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Action for CompositeAction {
    fn execute(&self) -> Result<bool, RollingError> {
        let mut status = true;
        for action in &self.actions {
            let done = match action.execute() {
                Ok(done) => done,
                Err(err) if !self.stop_on_error => {
                    warn!("Rollover step {action:?} failed: {err}");
                    false
                }
                Err(err) => return Err(err),
            };
            if !done {
                status = false;
                if self.stop_on_error {
                    break;
                }
            }
        }
        Ok(status)
    }
}

/// Compress `source` into `target` with zstd
#[derive(Debug, Clone)]
pub struct ZstdCompressAction {
    source: PathBuf,
    target: PathBuf,
    delete_source: bool,
    level: i32,
}

impl ZstdCompressAction {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, delete_source: bool) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            delete_source,
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Action for ZstdCompressAction {
    fn execute(&self) -> Result<bool, RollingError> {
        let input = match File::open(&self.source) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        let output = File::create(&self.target)?;
        zstd::stream::copy_encode(BufReader::new(input), output, self.level)?;
        if self.delete_source {
            fs::remove_file(&self.source)?;
        }
        debug!(
            "Compressed {} into {}",
            self.source.display(),
            self.target.display()
        );
        Ok(true)
    }
}

/// Owned handle to an action running on a background worker.
/// Closing (or dropping) the handle blocks until the work has finished.
#[derive(Debug)]
pub struct ActionHandle {
    description: String,
    worker: Option<JoinHandle<Result<bool, RollingError>>>,
}

impl ActionHandle {
    /// Start `action` on its own worker thread
    pub fn spawn(action: Box<dyn Action>) -> io::Result<Self> {
        let description = format!("{action:?}");
        let worker = thread::Builder::new()
            .name("rollover-action".into())
            .spawn(move || action.execute())?;
        Ok(Self {
            description,
            worker: Some(worker),
        })
    }

    /// Block until the background execution completes
    pub fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.join() {
            Ok(Ok(true)) => debug!("Background action {} completed", self.description),
            Ok(Ok(false)) => debug!("Background action {} had nothing to do", self.description),
            Ok(Err(err)) => warn!("Background action {} failed: {err}", self.description),
            Err(_) => warn!("Background action {} panicked", self.description),
        }
    }
}

impl Drop for ActionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
