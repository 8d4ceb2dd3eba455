//! Shared fixtures for the unit tests.

use crate::{config::Config, format::SampleFormat, host::HwParams, sink::create_fifo};
use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read, Write},
    os::{fd::RawFd, unix::fs::OpenOptionsExt},
    path::PathBuf,
};
use tempfile::TempDir;

/// Sink with pipe-like semantics: a write either fits whole or would block.
#[derive(Debug, Default)]
pub struct MockSink {
    pub data: Vec<u8>,
    pub writes: Vec<usize>,
    /// Bytes accepted before writes would block
    pub capacity: Option<usize>,
    /// Bytes accepted before writes fail hard
    pub fail_after: Option<usize>,
}

impl MockSink {
    pub fn with_capacity(capacity: usize) -> Self {
        MockSink {
            capacity: Some(capacity),
            ..Default::default()
        }
    }

    pub fn failing_after(bytes: usize) -> Self {
        MockSink {
            fail_after: Some(bytes),
            ..Default::default()
        }
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(limit) = self.fail_after {
            if self.data.len() >= limit {
                return Err(io::Error::from(ErrorKind::BrokenPipe));
            }
        }

        if let Some(capacity) = self.capacity {
            if buf.len() > capacity - self.data.len() {
                return Err(io::Error::from(ErrorKind::WouldBlock));
            }
        }

        self.data.extend_from_slice(buf);
        self.writes.push(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// S16_LE stereo, 4 bytes per frame
pub fn stereo_params(buffer_size: u64, period_size: u64) -> HwParams {
    HwParams {
        format: SampleFormat::S16Le,
        channels: 2,
        rate: 48000,
        buffer_size,
        period_size,
    }
}

/// Fills every frame with its own index, so byte order is easy to check.
pub fn fill_indexed(ring: &mut [u8], frame_bytes: usize) {
    for (i, frame) in ring.chunks_mut(frame_bytes).enumerate() {
        let bytes = (i as u32).to_le_bytes();
        frame.copy_from_slice(&bytes[..frame_bytes]);
    }
}

pub struct TestFifo {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestFifo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snd.fifo");
        create_fifo(&path).unwrap();

        TestFifo { _dir: dir, path }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.path)
    }

    pub fn reader(&self) -> File {
        OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .unwrap()
    }

    /// Only valid while some reader holds the fifo open
    pub fn writer(&self) -> File {
        OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .unwrap()
    }
}

/// Reads everything currently in the fifo.
pub fn read_available(file: &mut File) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => panic!("fifo read failed: {e}"),
        }
    }

    out
}

/// Writes until the fifo has no room left.
pub fn fill_fifo(file: &mut File) -> usize {
    let buf = [0xAAu8; 4096];
    let mut total = 0;

    loop {
        match file.write(&buf) {
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => panic!("fifo write failed: {e}"),
        }
    }

    // Top up byte by byte in case the last page was only partly used
    while let Ok(n) = file.write(&buf[..1]) {
        total += n;
    }

    total
}

/// Zero-timeout check for a readable descriptor.
pub fn is_readable(fd: RawFd) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    // SAFETY: `pfd` is a single valid pollfd that outlives the call
    let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
    assert!(rc >= 0, "poll failed: {}", io::Error::last_os_error());
    pfd.revents & libc::POLLIN != 0
}
