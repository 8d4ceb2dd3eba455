//! In-memory host: owns the ring buffer and the pointers, and applies the
//! framework's rules for folding the engine's pointer into its own.

use crate::{
    error::{Error, Result},
    host::{Host, HwParams, StreamState},
    position::playback_avail,
};

/// Largest power-of-two multiple of the buffer size that keeps pointer
/// arithmetic clear of overflow.
pub fn default_boundary(buffer_size: u64) -> u64 {
    let limit = i64::MAX as u64 - buffer_size;
    let mut boundary = buffer_size.max(1);
    while boundary * 2 <= limit {
        boundary *= 2;
    }
    boundary
}

#[derive(Debug)]
pub struct RingHost {
    params: HwParams,
    boundary: u64,
    state: StreamState,
    hw_ptr: u64,
    appl_ptr: u64,
    last_hw: u64,
    ring: Vec<u8>,
}

impl RingHost {
    pub fn new(params: HwParams, boundary: u64) -> Result<RingHost> {
        if params.buffer_size == 0 || params.period_size == 0 || params.frame_bytes() == 0 {
            return Err(Error::InvalidArgument(
                "buffer, period and frame must not be empty".to_string(),
            ));
        }

        if boundary < params.buffer_size || boundary % params.buffer_size != 0 {
            return Err(Error::InvalidArgument(format!(
                "boundary {boundary} is not a multiple of the buffer size {}",
                params.buffer_size
            )));
        }

        let len = params.checked_frames_to_bytes(params.buffer_size)?;
        let mut ring = Vec::new();
        ring.try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory)?;
        ring.resize(len, 0);

        Ok(RingHost {
            params,
            boundary,
            state: StreamState::Setup,
            hw_ptr: 0,
            appl_ptr: 0,
            last_hw: 0,
            ring,
        })
    }

    pub fn with_default_boundary(params: HwParams) -> Result<RingHost> {
        let boundary = default_boundary(params.buffer_size);
        RingHost::new(params, boundary)
    }

    /// Resets both pointers and enters the prepared state.
    pub fn prepare(&mut self) {
        self.hw_ptr = 0;
        self.appl_ptr = 0;
        self.last_hw = 0;
        self.state = StreamState::Prepared;
    }

    /// Frames the application may write right now
    pub fn avail(&self) -> u64 {
        playback_avail(
            self.hw_ptr,
            self.appl_ptr,
            self.params.buffer_size,
            self.boundary,
        )
    }

    /// Copies as many whole frames of `pcm` as fit into the ring at the
    /// application pointer and commits them. Returns the frames copied.
    pub fn write(&mut self, pcm: &[u8]) -> u64 {
        let frame_bytes = self.params.frame_bytes();
        let buffer_size = self.params.buffer_size;
        let frames = self.avail().min(self.params.bytes_to_frames(pcm.len()));

        let mut copied = 0;
        while copied < frames {
            let offset = (self.appl_ptr + copied) % buffer_size;
            let run = (frames - copied).min(buffer_size - offset);

            let src = self.params.frames_to_bytes(copied);
            let dst = offset as usize * frame_bytes;
            let len = self.params.frames_to_bytes(run);
            self.ring[dst..dst + len].copy_from_slice(&pcm[src..src + len]);

            copied += run;
        }

        self.forward_appl(frames);
        frames
    }

    pub fn forward_appl(&mut self, frames: u64) {
        self.appl_ptr = (self.appl_ptr + frames) % self.boundary;
    }

    /// Places both pointers directly, as after a reposition of the stream.
    pub fn set_pointers(&mut self, hw_ptr: u64, appl_ptr: u64) {
        self.hw_ptr = hw_ptr % self.boundary;
        self.last_hw = self.hw_ptr;
        self.appl_ptr = appl_ptr % self.boundary;
    }

    /// The whole ring, for filling in place.
    pub fn ring_mut(&mut self) -> &mut [u8] {
        &mut self.ring
    }
}

impl Host for RingHost {
    fn state(&self) -> StreamState {
        self.state
    }

    fn set_state(&mut self, state: StreamState) -> Result<()> {
        self.state = state;
        Ok(())
    }

    fn params(&self) -> &HwParams {
        &self.params
    }

    fn hw_ptr(&self) -> u64 {
        self.hw_ptr
    }

    fn appl_ptr(&self) -> u64 {
        self.appl_ptr
    }

    fn boundary(&self) -> Result<u64> {
        Ok(self.boundary)
    }

    fn area(&self, offset: u64, frames: u64) -> &[u8] {
        let start = self.params.frames_to_bytes(offset);
        let len = self.params.frames_to_bytes(frames);
        &self.ring[start..start + len]
    }

    fn sync_hw_ptr(&mut self, reported: Option<u64>) -> Result<()> {
        let Some(hw) = reported else {
            if self.state == StreamState::Draining {
                // Drained, drop the stream
                self.state = StreamState::Setup;
                return Ok(());
            }
            return Err(Error::BrokenPipe);
        };

        let delta = if hw >= self.last_hw {
            hw - self.last_hw
        } else {
            self.boundary + hw - self.last_hw
        };

        self.hw_ptr = (self.hw_ptr + delta) % self.boundary;
        self.last_hw = hw;

        if self.state == StreamState::Draining && self.avail() >= self.params.buffer_size {
            self.state = StreamState::Setup;
        }

        Ok(())
    }
}
