use std::time::Duration;

// Largest write the kernel guarantees to be atomic on a pipe
pub const PIPE_BUF: usize = libc::PIPE_BUF;

// Period of the timer watched while waiting for the fifo to empty
pub const DRAIN_POLL_PERIOD: Duration = Duration::from_millis(25);

pub const MAX_DEBUG_LEVEL: i64 = 127;
pub const MAX_LEAD_IN_FRAMES: u32 = 16384;
pub const MAX_FORMATS: usize = 64;

// Hardware constraints declared to the host
pub const PERIOD_BYTES_MIN: u64 = 512;
pub const PERIOD_BYTES_MAX: u64 = 262144;
pub const BUFFER_BYTES_MIN: u64 = 1024;
pub const BUFFER_BYTES_MAX: u64 = 524288;
pub const RATE_MIN: u32 = 8000;
pub const RATE_MAX: u32 = 384000;
pub const CHANNELS_MIN: u32 = 1;
pub const CHANNELS_MAX: u32 = 16;
