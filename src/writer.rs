use crate::{
    config::Verbosity,
    constants::PIPE_BUF,
    error::{Error, Result},
};
use std::io::{ErrorKind, Write};

/// Writes frames to a non-blocking sink in chunks no larger than one atomic
/// pipe write, so a single `write` is either taken whole or refused.
#[derive(Clone, Copy, Debug)]
pub struct ChunkWriter {
    frame_bytes: usize,
    chunk_bytes: usize,
    verbosity: Verbosity,
}

impl ChunkWriter {
    pub fn new(frame_bytes: usize, verbosity: Verbosity) -> Self {
        let frame_bytes = frame_bytes.max(1);
        let chunk_bytes = (PIPE_BUF - PIPE_BUF % frame_bytes).max(frame_bytes);

        ChunkWriter {
            frame_bytes,
            chunk_bytes,
            verbosity,
        }
    }

    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Largest single write, floor-aligned to whole frames
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Writes as much of `buf` as the sink takes without blocking.
    ///
    /// Returns the whole frames written, which is 0 when the sink was already
    /// full. A hard failure is only reported when nothing at all was written;
    /// after partial progress the partial count is returned instead.
    pub fn write<W: Write + ?Sized>(&self, sink: &mut W, buf: &[u8]) -> Result<u64> {
        let mut written = 0;

        while written < buf.len() {
            let end = buf.len().min(written + self.chunk_bytes);

            match sink.write(&buf[written..end]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if self.verbosity.detailed() {
                        trace!("The fifo is full after {written} of {} bytes", buf.len());
                    }
                    break;
                }
                Err(e) => {
                    if self.verbosity.enabled() {
                        error!("Write to the fifo failed: {e}");
                    }
                    if written == 0 {
                        return Err(Error::BrokenPipe);
                    }
                    break;
                }
            }
        }

        Ok((written / self.frame_bytes) as u64)
    }
}
