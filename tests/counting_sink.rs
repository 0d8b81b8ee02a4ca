use rolling_file_appender::{CountingSink, FileLength};
use std::io::{self, Write};
use std::sync::Arc;

// Records flushes so forwarding can be observed
#[derive(Default)]
struct RecordingSink {
    bytes: Vec<u8>,
    flushes: usize,
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

// Accepts at most `limit` bytes per call
struct ShortWriteSink {
    limit: usize,
    bytes: Vec<u8>,
}

impl Write for ShortWriteSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.limit);
        self.bytes.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn counts_every_buffer_written() {
    let length = Arc::new(FileLength::default());
    let mut sink = CountingSink::new(RecordingSink::default(), Arc::clone(&length));

    let buffers: [&[u8]; 4] = [b"first line\n", b"", b"second\n", &[0u8; 300]];
    for buf in buffers {
        sink.write_all(buf).unwrap();
    }

    let expected: usize = buffers.iter().map(|b| b.len()).sum();
    assert_eq!(length.get(), expected as u64);
    assert_eq!(sink.get_ref().bytes.len(), expected);
}

#[test]
fn counts_from_the_starting_length() {
    let length = Arc::new(FileLength::new(1000));
    let mut sink = CountingSink::new(RecordingSink::default(), Arc::clone(&length));
    sink.write_all(b"0123456789").unwrap();
    assert_eq!(length.get(), 1010);

    length.set(0);
    sink.write_all(b"abc").unwrap();
    assert_eq!(length.get(), 3);
}

#[test]
fn short_writes_count_only_accepted_bytes() {
    let length = Arc::new(FileLength::default());
    let mut sink = CountingSink::new(
        ShortWriteSink {
            limit: 3,
            bytes: Vec::new(),
        },
        Arc::clone(&length),
    );

    assert_eq!(sink.write(b"abcdefgh").unwrap(), 3);
    assert_eq!(length.get(), 3);

    sink.write_all(b"defgh").unwrap();
    assert_eq!(length.get(), 8);
    assert_eq!(sink.into_inner().bytes, b"abcdefgh");
}

#[test]
fn failed_write_is_not_counted() {
    let length = Arc::new(FileLength::default());
    let mut sink = CountingSink::new(FailingSink, Arc::clone(&length));

    assert!(sink.write_all(b"lost").is_err());
    assert_eq!(length.get(), 0);
}

#[test]
fn flush_is_forwarded() {
    let length = Arc::new(FileLength::default());
    let mut sink = CountingSink::new(RecordingSink::default(), length);
    sink.flush().unwrap();
    sink.flush().unwrap();
    assert_eq!(sink.get_ref().flushes, 2);
}
