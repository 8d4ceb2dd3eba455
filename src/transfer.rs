use crate::{error::Result, host::Host, writer::ChunkWriter};
use std::io::Write;

/// Transfers up to `frames` frames starting at hardware pointer `ptr`,
/// splitting the range in two when it runs past the physical end of the ring.
///
/// The head of the ring is only attempted once the tail has been written in
/// full, so bytes always reach the sink in order and never twice. Must be
/// called with the host borrowed for the whole call.
pub fn transfer_wrapped<W, H>(
    writer: &ChunkWriter,
    sink: &mut W,
    host: &H,
    ptr: u64,
    frames: u64,
) -> Result<u64>
where
    W: Write + ?Sized,
    H: Host + ?Sized,
{
    let buffer_size = host.params().buffer_size;
    let offset = ptr % buffer_size;
    let remaining = buffer_size - offset;
    let verbosity = writer.verbosity();

    if verbosity.detailed() {
        trace!("Transferring {frames} frames, {remaining} before the ring wraps");
    }

    let written = if offset + frames > buffer_size {
        let tail = writer.write(sink, host.area(offset, remaining))?;

        if tail == remaining {
            if verbosity.detailed() {
                trace!(
                    "Wrote up to the end of the ring, wrapping for {} more frames",
                    frames - remaining
                );
            }

            // The tail already counts as progress, a failure here only ends the transfer
            match writer.write(sink, host.area(0, frames - remaining)) {
                Ok(head) => tail + head,
                Err(_) => tail,
            }
        } else {
            tail
        }
    } else {
        writer.write(sink, host.area(offset, frames))?
    };

    if verbosity.detailed() {
        trace!("Transferred {written} frames to the fifo");
    }

    Ok(written)
}
