use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Estimated byte length of the active file, shared between the
/// appender and the sink that feeds it
#[derive(Debug, Default)]
pub struct FileLength(AtomicU64);

impl FileLength {
    pub fn new(length: u64) -> Self {
        Self(AtomicU64::new(length))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, length: u64) {
        self.0.store(length, Ordering::Relaxed);
    }

    pub fn add(&self, increment: u64) {
        self.0.fetch_add(increment, Ordering::Relaxed);
    }
}

/// Wraps a sink and reports every accepted byte to a `FileLength`,
/// so the hot append path never has to stat the file
pub struct CountingSink<W: Write> {
    inner: W,
    length: Arc<FileLength>,
}

impl<W: Write> CountingSink<W> {
    pub fn new(inner: W, length: Arc<FileLength>) -> Self {
        Self { inner, length }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.length.add(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
