use crate::rolling::{
    Action, CompositeAction, FileDeleteAction, FileRenameAction, RollingError, RollingPolicy,
    RolloverPlan, ZstdCompressAction,
};
use log::warn;
use std::path::{Path, PathBuf};

/// Widest window a fixed-window policy will manage
pub const MAX_WINDOW_SIZE: u32 = 12;

const COMPRESSION_SUFFIX: &str = ".zst";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Index,
}

/// File name pattern with an integer placeholder `%i`; `%%` is a literal `%`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNamePattern {
    pattern: String,
    segments: Vec<Segment>,
}

impl FileNamePattern {
    pub fn parse(pattern: &str) -> Result<Self, RollingError> {
        let invalid = |reason| RollingError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut has_index = false;
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                Some('i') => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Index);
                    has_index = true;
                }
                Some('%') => literal.push('%'),
                _ => return Err(invalid("only %i and %% conversions are supported")),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        if !has_index {
            return Err(invalid("pattern must contain %i"));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// `<file>.%i`, with any `%` in the file name escaped. Patterns are
    /// text, so a file name that is not valid UTF-8 is rejected.
    pub fn for_file(file: &Path) -> Result<String, RollingError> {
        let name = file.to_str().ok_or_else(|| RollingError::InvalidPattern {
            pattern: file.to_string_lossy().into_owned(),
            reason: "file name is not valid UTF-8",
        })?;
        Ok(format!("{}.%i", name.replace('%', "%%")))
    }

    pub fn format(&self, index: u32) -> PathBuf {
        let mut name = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Index => name.push_str(&index.to_string()),
            }
        }
        PathBuf::from(name)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

// only sees names produced by `FileNamePattern::format`, which are UTF-8
fn without_compression_suffix(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    PathBuf::from(name.strip_suffix(COMPRESSION_SUFFIX).unwrap_or(&*name))
}

/// Keeps backups `pattern(min_index)..=pattern(max_index)`, newest at `min_index`.
///
/// On rollover every existing backup moves one index up, the one at
/// `max_index` is deleted, and the active file becomes `pattern(min_index)`.
/// A pattern ending in `.zst` compresses the newest backup in the background.
#[derive(Debug, Clone)]
pub struct FixedWindowRollingPolicy {
    min_index: u32,
    max_index: u32,
    file_name_pattern: String,
}

impl FixedWindowRollingPolicy {
    pub fn new(min_index: u32, max_index: u32, file_name_pattern: impl Into<String>) -> Self {
        let file_name_pattern = file_name_pattern.into();
        let mut max_index = max_index;
        if max_index > min_index && max_index - min_index > MAX_WINDOW_SIZE {
            warn!(
                "Large window sizes are not allowed, capping {file_name_pattern:?} at index {}",
                min_index + MAX_WINDOW_SIZE
            );
            max_index = min_index + MAX_WINDOW_SIZE;
        }
        Self {
            min_index,
            max_index,
            file_name_pattern,
        }
    }

    /// Window `[1, max_backup_index]` over `<file>.%i`
    pub fn for_file(file: &Path, max_backup_index: u32) -> Result<Self, RollingError> {
        Ok(Self::new(1, max_backup_index, FileNamePattern::for_file(file)?))
    }

    pub fn min_index(&self) -> u32 {
        self.min_index
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    pub fn file_name_pattern(&self) -> &str {
        &self.file_name_pattern
    }

    fn keeps_backups(&self) -> bool {
        self.max_index > 0 && self.max_index >= self.min_index
    }

    fn is_compressed(&self) -> bool {
        self.file_name_pattern.ends_with(COMPRESSION_SUFFIX)
    }

    /// Steps that free `pattern(min_index)`: stale duplicates and the evicted
    /// backup are deleted first, then renames run from the highest index down
    fn purge(&self, pattern: &FileNamePattern) -> Vec<Box<dyn Action>> {
        let compressed = self.is_compressed();
        let mut deletions: Vec<Box<dyn Action>> = Vec::new();
        let mut renames: Vec<Box<dyn Action>> = Vec::new();

        for index in self.min_index..=self.max_index {
            let mut candidate = pattern.format(index);
            let mut uncompressed = false;
            if compressed {
                let base = without_compression_suffix(&candidate);
                if candidate.exists() {
                    if base.exists() {
                        deletions.push(Box::new(FileDeleteAction::new(base)));
                    }
                } else {
                    candidate = base;
                    uncompressed = true;
                }
            }

            // backups are contiguous; stop at the first gap
            if !candidate.exists() {
                break;
            }

            if index == self.max_index {
                deletions.push(Box::new(FileDeleteAction::new(candidate)));
                break;
            }

            let mut target = pattern.format(index + 1);
            if uncompressed {
                target = without_compression_suffix(&target);
            }
            renames.push(Box::new(FileRenameAction::new(candidate, target, true)));
        }

        deletions.extend(renames.into_iter().rev());
        deletions
    }
}

impl RollingPolicy for FixedWindowRollingPolicy {
    fn activate(&self) -> Result<(), RollingError> {
        FileNamePattern::parse(&self.file_name_pattern)?;
        if !self.keeps_backups() {
            warn!(
                "Window [{}, {}] of {:?} keeps no backups, rollover truncates the active file",
                self.min_index, self.max_index, self.file_name_pattern
            );
        }
        Ok(())
    }

    fn initialize(&self, _active_file: &Path, _append: bool) -> Result<Option<RolloverPlan>, RollingError> {
        Ok(None)
    }

    fn rollover(&self, active_file: &Path) -> Result<Option<RolloverPlan>, RollingError> {
        let pattern = FileNamePattern::parse(&self.file_name_pattern)?;
        if !self.keeps_backups() {
            return Ok(Some(RolloverPlan::new(active_file, false, None, None)));
        }

        let mut steps = self.purge(&pattern);
        let newest = pattern.format(self.min_index);
        let (rename_to, compress) = if self.is_compressed() {
            let base = without_compression_suffix(&newest);
            let compress: Box<dyn Action> =
                Box::new(ZstdCompressAction::new(base.clone(), newest, true));
            (base, Some(compress))
        } else {
            (newest, None)
        };
        steps.push(Box::new(FileRenameAction::new(active_file, rename_to, false)));

        Ok(Some(RolloverPlan::new(
            active_file,
            false,
            Some(Box::new(CompositeAction::new(steps, true))),
            compress,
        )))
    }
}
