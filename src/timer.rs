use crate::error::{Error, Result};
use byteorder::{ByteOrder, NativeEndian};
use std::{
    fs::File,
    io::{self, ErrorKind, Read},
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
    time::Duration,
};

/// Periodic monotonic timerfd, watched instead of the fifo while a drain waits
/// for the consumer.
#[derive(Debug)]
pub struct Timer {
    fd: Option<File>,
    armed: bool,
}

impl Timer {
    pub fn create() -> Result<Timer> {
        // SAFETY: plain syscall, no pointers involved
        let fd = unsafe {
            libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_NONBLOCK | libc::TFD_CLOEXEC)
        };
        if fd < 0 {
            return Err(Error::io(
                "failed to create timer fd",
                io::Error::last_os_error(),
            ));
        }

        // SAFETY: `fd` was just returned by timerfd_create and has no other owner
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        Ok(Timer {
            fd: Some(File::from(fd)),
            armed: false,
        })
    }

    pub fn fd(&self) -> Option<RawFd> {
        self.fd.as_ref().map(|file| file.as_raw_fd())
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm(&mut self, period: Duration) -> Result<()> {
        self.set(Some(period))
    }

    pub fn disarm(&mut self) -> Result<()> {
        self.set(None)
    }

    fn set(&mut self, period: Option<Duration>) -> Result<()> {
        let fd = self.fd().ok_or(Error::BadDescriptor)?;

        let interval = timespec(period.unwrap_or_default());
        let spec = libc::itimerspec {
            it_interval: interval,
            it_value: interval,
        };

        // SAFETY: `spec` is valid for the call, the old value is not requested
        let rc = unsafe { libc::timerfd_settime(fd, 0, &spec, std::ptr::null_mut()) };
        if rc != 0 {
            return Err(Error::io(
                "failed to set the timer",
                io::Error::last_os_error(),
            ));
        }

        self.armed = period.is_some();
        Ok(())
    }

    /// Consumes pending expirations so the descriptor stops polling readable.
    pub fn acknowledge(&mut self) -> Result<u64> {
        let file = self.fd.as_mut().ok_or(Error::BadDescriptor)?;

        let mut buf = [0u8; 8];
        match file.read(&mut buf) {
            Ok(8) => Ok(NativeEndian::read_u64(&buf)),
            Ok(_) => Ok(0),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(Error::io("failed to read the timer", e)),
        }
    }

    /// Releases the descriptor. Safe to call any number of times.
    pub fn close(&mut self) {
        self.fd.take();
        self.armed = false;
    }
}

fn timespec(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    }
}
