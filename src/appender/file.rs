use crate::appender::{Layout, LogEvent};
use crate::rolling::RollingError;
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

pub type BoxedWriter = Box<dyn Write + Send>;

/// Hook applied to every freshly opened file before it becomes the writer
pub type SinkWrapper = Box<dyn Fn(File) -> BoxedWriter + Send + Sync>;

/// Single-file appender: open, append, write, close
pub struct FileAppender {
    file: PathBuf,
    append: bool,
    buffered_io: bool,
    buffer_size: usize,
    layout: Arc<dyn Layout>,
    writer: Option<BoxedWriter>,
    wrap_sink: Option<SinkWrapper>,
}

impl FileAppender {
    pub fn new(file: impl Into<PathBuf>, layout: Arc<dyn Layout>) -> Self {
        Self {
            file: file.into(),
            append: true,
            buffered_io: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            layout,
            writer: None,
            wrap_sink: None,
        }
    }

    /// Install the hook used by `create_writer`
    pub fn set_sink_wrapper(&mut self, wrapper: SinkWrapper) {
        self.wrap_sink = Some(wrapper);
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Change the file name only; the current writer is left alone
    pub fn set_file_name(&mut self, file: impl Into<PathBuf>) {
        self.file = file.into();
    }

    pub fn is_append(&self) -> bool {
        self.append
    }

    pub fn set_append(&mut self, append: bool) {
        self.append = append;
    }

    pub fn set_buffered_io(&mut self, buffered_io: bool) {
        self.buffered_io = buffered_io;
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size.max(1);
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Open the configured file with the configured append mode
    pub fn activate(&mut self) -> Result<(), RollingError> {
        let file = self.file.clone();
        self.set_file(&file, self.append)
    }

    /// Open `path` for writing, creating missing parent directories
    pub fn open_sink(path: &Path, append: bool) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        options.open(path)
    }

    pub fn create_writer(&self, sink: File) -> BoxedWriter {
        let writer: BoxedWriter = match &self.wrap_sink {
            Some(wrap) => wrap(sink),
            None => Box::new(sink),
        };
        if self.buffered_io {
            Box::new(BufWriter::with_capacity(self.buffer_size, writer))
        } else {
            writer
        }
    }

    /// Open `path`, swap it in as the writer and write the layout header
    pub fn set_file(&mut self, path: &Path, append: bool) -> Result<(), RollingError> {
        let sink = Self::open_sink(path, append)?;
        let writer = self.create_writer(sink);
        self.close_writer();
        self.file = path.to_path_buf();
        self.append = append;
        self.set_writer(writer);
        self.write_header()
    }

    pub fn set_writer(&mut self, writer: BoxedWriter) {
        self.writer = Some(writer);
    }

    /// Write the footer, flush and drop the current writer
    pub fn close_writer(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        let footer = self.layout.footer();
        let result = footer
            .map(|footer| writer.write_all(footer.as_bytes()))
            .unwrap_or(Ok(()))
            .and_then(|_| writer.flush());
        if let Err(err) = result {
            warn!("Could not close writer for {}: {err}", self.file.display());
        }
    }

    pub fn write_header(&mut self) -> Result<(), RollingError> {
        let Some(header) = self.layout.header() else {
            return Ok(());
        };
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| RollingError::NoWriter(self.file.clone()))?;
        writer.write_all(header.as_bytes())?;
        if !self.buffered_io {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn write_event(&mut self, event: &LogEvent) -> Result<(), RollingError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| RollingError::NoWriter(self.file.clone()))?;
        let line = self.layout.format(event);
        writer.write_all(line.as_bytes())?;
        if !self.buffered_io {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.close_writer();
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        self.close_writer();
    }
}
