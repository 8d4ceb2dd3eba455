//! The two non-blocking handles a session keeps on its fifo.
//!
//! Writes go through the write-only handle. The read-only handle is never used
//! to consume audio: it keeps the fifo open so the write side can be opened
//! without a consumer, lets the engine probe whether the consumer has caught
//! up, and discards residual bytes when a stream is dropped.

use crate::error::{Error, Result};
use std::{
    ffi::CString,
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read},
    os::unix::{
        ffi::OsStrExt,
        fs::{FileTypeExt, OpenOptionsExt},
        io::{AsRawFd, RawFd},
    },
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub struct Sink {
    path: PathBuf,
    write: Option<File>,
    read: Option<File>,
}

impl Sink {
    pub fn open(path: impl AsRef<Path>) -> Result<Sink> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::io(format!("failed to open fifo {}", path.display()), e))?;

        if !metadata.file_type().is_fifo() {
            return Err(Error::Config(format!("{} is not a fifo", path.display())));
        }

        // Read side first, a non-blocking write-only open fails without a reader
        let read = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| {
                Error::io(format!("failed to open fifo {} for reading", path.display()), e)
            })?;

        let write = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| {
                Error::io(format!("failed to open fifo {} for writing", path.display()), e)
            })?;

        Ok(Sink {
            path: path.to_path_buf(),
            write: Some(write),
            read: Some(read),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.write.is_some() && self.read.is_some()
    }

    pub fn writer(&mut self) -> Result<&mut File> {
        self.write.as_mut().ok_or(Error::BadDescriptor)
    }

    pub fn write_fd(&self) -> Option<RawFd> {
        self.write.as_ref().map(|file| file.as_raw_fd())
    }

    /// Zero-timeout probe for bytes the consumer has not read yet.
    pub fn has_unread(&self) -> Result<bool> {
        let fd = self
            .read
            .as_ref()
            .map(|file| file.as_raw_fd())
            .ok_or(Error::BadDescriptor)?;

        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        loop {
            // SAFETY: `pfd` is a single valid pollfd that outlives the call
            let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
            if rc >= 0 {
                break;
            }

            let e = io::Error::last_os_error();
            if e.kind() != ErrorKind::Interrupted {
                return Err(Error::io("unable to query the fifo status", e));
            }
        }

        Ok(pfd.revents & libc::POLLIN != 0)
    }

    /// Reads and discards whatever is sitting in the fifo, returning the
    /// number of bytes dropped.
    pub fn clear(&mut self, chunk_bytes: usize) -> Result<usize> {
        let reader = self.read.as_mut().ok_or(Error::BadDescriptor)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(chunk_bytes)
            .map_err(|_| Error::OutOfMemory)?;
        buf.resize(chunk_bytes.max(1), 0);

        let mut cleared = 0;
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => cleared += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(Error::io("failed to clear the fifo", e)),
            }
        }

        Ok(cleared)
    }

    /// Releases both handles. Safe to call any number of times.
    pub fn close(&mut self) {
        self.write.take();
        self.read.take();
    }
}

/// Creates a named pipe at `path`.
pub fn create_fifo(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| Error::InvalidArgument(format!("{} contains a NUL byte", path.display())))?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    if rc != 0 {
        return Err(Error::io(
            format!("failed to create fifo {}", path.display()),
            io::Error::last_os_error(),
        ));
    }

    Ok(())
}
