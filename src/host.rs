//! The contract between the engine and the audio framework that owns the
//! ring buffer.
//!
//! The framework keeps the stream state, the application pointer and the ring
//! memory. Every engine callback borrows the host for its whole duration, which
//! stands in for the framework's per-stream lock: the pointers and the ring
//! contents cannot move underneath a transfer.

use crate::{
    error::{Error, Result},
    format::SampleFormat,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Setup,
    Prepared,
    Running,
    Xrun,
    Draining,
    Paused,
    Suspended,
    Disconnected,
}

impl StreamState {
    pub fn name(self) -> &'static str {
        match self {
            StreamState::Open => "OPEN",
            StreamState::Setup => "SETUP",
            StreamState::Prepared => "PREPARED",
            StreamState::Running => "RUNNING",
            StreamState::Xrun => "XRUN",
            StreamState::Draining => "DRAINING",
            StreamState::Paused => "PAUSED",
            StreamState::Suspended => "SUSPENDED",
            StreamState::Disconnected => "DISCONNECTED",
        }
    }
}

/// Negotiated hardware parameters of a playback stream. Sizes are in frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HwParams {
    pub format: SampleFormat,
    pub channels: u32,
    pub rate: u32,
    pub buffer_size: u64,
    pub period_size: u64,
}

impl HwParams {
    pub fn frame_bytes(&self) -> usize {
        self.format.physical_bytes() * self.channels as usize
    }

    pub fn frames_to_bytes(&self, frames: u64) -> usize {
        frames as usize * self.frame_bytes()
    }

    /// Byte size of `frames`, for sizes that have not been validated yet.
    pub fn checked_frames_to_bytes(&self, frames: u64) -> Result<usize> {
        usize::try_from(frames)
            .ok()
            .and_then(|frames| frames.checked_mul(self.frame_bytes()))
            .ok_or_else(|| Error::InvalidArgument(format!("{frames} frames do not fit in memory")))
    }

    pub fn bytes_to_frames(&self, bytes: usize) -> u64 {
        (bytes / self.frame_bytes()) as u64
    }
}

pub trait Host {
    fn state(&self) -> StreamState;

    fn set_state(&mut self, state: StreamState) -> Result<()>;

    fn params(&self) -> &HwParams;

    /// Hardware pointer as last synchronised by the host, in `[0, boundary)`
    fn hw_ptr(&self) -> u64;

    /// Application pointer, in `[0, boundary)`
    fn appl_ptr(&self) -> u64;

    /// Wraparound modulus of both pointers
    fn boundary(&self) -> Result<u64>;

    /// Bytes of `frames` frames starting at physical ring offset `offset`.
    ///
    /// `offset + frames` never exceeds the buffer size.
    fn area(&self, offset: u64, frames: u64) -> &[u8];

    /// Folds a pointer reported by the engine into the host's own hardware
    /// pointer. `None` is the halted sentinel: a draining stream is dropped,
    /// any other stream fails with a broken pipe.
    fn sync_hw_ptr(&mut self, reported: Option<u64>) -> Result<()>;
}
