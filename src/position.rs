//! Hardware pointer bookkeeping.
//!
//! The pointer only ever moves by the number of frames the fifo actually
//! accepted, so the host's view of buffer fullness reflects what the consumer
//! can still read rather than what was asked for.

use crate::{
    drain::{Drain, Phase},
    error::{Error, Result},
    host::Host,
    transfer::transfer_wrapped,
    writer::ChunkWriter,
};
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwPtr {
    Frame(u64),
    /// Overrun, broken sink or completed drain. Sticky until the next prepare.
    Halted,
}

impl HwPtr {
    pub fn frame(self) -> Option<u64> {
        match self {
            HwPtr::Frame(frame) => Some(frame),
            HwPtr::Halted => None,
        }
    }

    /// Signed form handed to the host: the frame, or `-EPIPE` when halted.
    pub fn raw(self) -> i64 {
        match self {
            HwPtr::Frame(frame) => frame as i64,
            HwPtr::Halted => -(libc::EPIPE as i64),
        }
    }
}

/// Free space in a playback ring, `hw + buffer_size - appl` folded into
/// `[0, boundary)`.
pub fn playback_avail(hw: u64, appl: u64, buffer_size: u64, boundary: u64) -> u64 {
    let avail = hw as i128 + buffer_size as i128 - appl as i128;

    if avail < 0 {
        (avail + boundary as i128) as u64
    } else if avail >= boundary as i128 {
        (avail - boundary as i128) as u64
    } else {
        avail as u64
    }
}

#[derive(Debug)]
pub struct Tracker {
    ptr: HwPtr,
    boundary: u64,
}

impl Default for Tracker {
    fn default() -> Self {
        Tracker {
            ptr: HwPtr::Frame(0),
            boundary: i64::MAX as u64,
        }
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, hw_ptr: u64, boundary: u64) {
        self.boundary = boundary;
        self.ptr = HwPtr::Frame(hw_ptr % boundary);
    }

    pub fn ptr(&self) -> HwPtr {
        self.ptr
    }

    pub fn boundary(&self) -> u64 {
        self.boundary
    }

    pub fn halt(&mut self) {
        self.ptr = HwPtr::Halted;
    }

    /// Pointer as the host sees it from a pointer query.
    pub fn position(&self) -> Result<u64> {
        self.ptr.frame().ok_or(Error::BrokenPipe)
    }

    /// Moves the pointer forward, wrapping at the boundary. No-op once halted.
    pub fn forward(&mut self, frames: u64) {
        if let HwPtr::Frame(ptr) = self.ptr {
            let mut next = ptr + frames;
            if next >= self.boundary {
                next -= self.boundary;
            }
            self.ptr = HwPtr::Frame(next);
        }
    }

    /// Frames written by the application but not yet accepted by the fifo.
    pub fn buffered<H: Host + ?Sized>(&self, host: &H) -> u64 {
        let Some(ptr) = self.ptr.frame() else {
            return 0;
        };

        let buffer_size = host.params().buffer_size;
        let avail = playback_avail(ptr, host.appl_ptr(), buffer_size, self.boundary);
        buffer_size.saturating_sub(avail)
    }

    /// Pushes everything buffered in the ring towards the fifo and moves the
    /// pointer by what was accepted.
    ///
    /// While draining, the transfer that empties the ring moves the pointer one
    /// frame short and switches `phase` to waiting for the fifo to empty.
    pub fn advance<W, H>(
        &mut self,
        phase: &mut Phase,
        sink: &mut W,
        host: &H,
        writer: &ChunkWriter,
    ) -> Result<()>
    where
        W: Write + ?Sized,
        H: Host + ?Sized,
    {
        let verbosity = writer.verbosity();
        if verbosity.detailed() {
            trace!(
                "Trying to advance the hw pointer. Stream state is {}, phase is {:?}",
                host.state().name(),
                phase
            );
        }

        let draining = match *phase {
            Phase::Running => false,
            Phase::Draining(Drain::Active) => true,
            Phase::Overrun => {
                self.halt();
                return Ok(());
            }
            Phase::Idle | Phase::Draining(Drain::WaitEmpty) => return Ok(()),
        };

        let HwPtr::Frame(ptr) = self.ptr else {
            if verbosity.detailed() {
                trace!("Cannot advance the hw pointer, it is halted");
            }
            return Ok(());
        };

        let buffered = self.buffered(host);
        if buffered == 0 {
            return Ok(());
        }

        let written = match transfer_wrapped(writer, sink, host, ptr, buffered) {
            Ok(written) => written,
            Err(e) => {
                if verbosity.enabled() {
                    error!("Failed to advance the hw pointer: {e}");
                }
                self.halt();
                return Err(e);
            }
        };

        if draining && written == buffered {
            // Hold back one frame so the host keeps polling until the fifo is empty
            *phase = Phase::Draining(Drain::WaitEmpty);
            self.forward(written - 1);

            if verbosity.enabled() {
                debug!("Ring flushed to the fifo, waiting for the fifo to empty");
            }
        } else {
            self.forward(written);
        }

        Ok(())
    }
}
