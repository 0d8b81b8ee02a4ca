use crate::rolling::Action;
use std::path::{Path, PathBuf};

/// Outcome of one rolling-policy decision. Immutable once built.
#[derive(Debug)]
pub struct RolloverPlan {
    pub(crate) active_file: PathBuf,
    pub(crate) append: bool,
    pub(crate) synchronous: Option<Box<dyn Action>>,
    pub(crate) asynchronous: Option<Box<dyn Action>>,
}

impl RolloverPlan {
    pub fn new(
        active_file: impl Into<PathBuf>,
        append: bool,
        synchronous: Option<Box<dyn Action>>,
        asynchronous: Option<Box<dyn Action>>,
    ) -> Self {
        Self {
            active_file: active_file.into(),
            append,
            synchronous,
            asynchronous,
        }
    }

    /// File that receives writes once the plan is applied
    pub fn active_file(&self) -> &Path {
        &self.active_file
    }

    /// Whether the active file is opened in append mode
    pub fn append(&self) -> bool {
        self.append
    }

    /// Runs inline before logging resumes
    pub fn synchronous(&self) -> Option<&dyn Action> {
        self.synchronous.as_deref()
    }

    /// Handed off to a background worker after the file switch
    pub fn asynchronous(&self) -> Option<&dyn Action> {
        self.asynchronous.as_deref()
    }
}
