//! Unit tests for the chunking writer

#[cfg(test)]
mod tests {
    use crate::config::Verbosity;
    use crate::constants::PIPE_BUF;
    use crate::error::Error;
    use crate::test_util::MockSink;
    use crate::writer::ChunkWriter;

    #[test]
    fn test_chunk_size_is_frame_aligned() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        assert_eq!(writer.chunk_bytes(), PIPE_BUF);

        // 3-byte samples in stereo
        let writer = ChunkWriter::new(6, Verbosity::default());
        assert_eq!(writer.chunk_bytes(), PIPE_BUF - PIPE_BUF % 6);
        assert_eq!(writer.chunk_bytes() % 6, 0);
    }

    #[test]
    fn test_write_splits_into_chunks() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let buf: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
        let mut sink = MockSink::default();

        let frames = writer.write(&mut sink, &buf).unwrap();

        assert_eq!(frames, 2500);
        assert_eq!(sink.data, buf);
        assert_eq!(sink.writes, vec![PIPE_BUF, PIPE_BUF, 10_000 - 2 * PIPE_BUF]);
        assert!(sink.writes.iter().all(|n| *n <= PIPE_BUF));
    }

    #[test]
    fn test_would_block_returns_partial_count() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let buf = vec![1u8; 3 * PIPE_BUF];
        let mut sink = MockSink::with_capacity(PIPE_BUF + 100);

        let frames = writer.write(&mut sink, &buf).unwrap();

        assert_eq!(frames, (PIPE_BUF / 4) as u64);
        assert_eq!(sink.data.len(), PIPE_BUF);
    }

    #[test]
    fn test_full_sink_is_not_an_error() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let mut sink = MockSink::with_capacity(0);

        assert_eq!(writer.write(&mut sink, &[0u8; 64]).unwrap(), 0);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_hard_failure_without_progress_is_broken_pipe() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let mut sink = MockSink::failing_after(0);

        let result = writer.write(&mut sink, &[0u8; 64]);

        assert!(matches!(result, Err(Error::BrokenPipe)));
    }

    #[test]
    fn test_hard_failure_after_progress_keeps_partial_count() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let buf = vec![1u8; 2 * PIPE_BUF];
        let mut sink = MockSink::failing_after(PIPE_BUF);

        let frames = writer.write(&mut sink, &buf).unwrap();

        assert_eq!(frames, (PIPE_BUF / 4) as u64);
    }

    #[test]
    fn test_empty_buffer_writes_nothing() {
        let writer = ChunkWriter::new(4, Verbosity::default());
        let mut sink = MockSink::default();

        assert_eq!(writer.write(&mut sink, &[]).unwrap(), 0);
        assert!(sink.writes.is_empty());
    }
}
