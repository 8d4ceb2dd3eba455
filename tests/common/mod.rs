//! Test infrastructure for pcm-fifo integration tests.
//!
//! Provides throwaway fifos, a player wired to one, and a consumer that
//! drains the fifo on a plain thread the way an audio daemon would.

#![allow(dead_code)]

use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read},
    os::unix::fs::OpenOptionsExt,
    path::{Path, PathBuf},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tempfile::TempDir;

pub use pcm_fifo::config::Config;
pub use pcm_fifo::format::SampleFormat;
pub use pcm_fifo::host::{Host, HwParams, StreamState};
pub use pcm_fifo::player::Player;
pub use pcm_fifo::ring::RingHost;
pub use pcm_fifo::session::Session;

/// A named pipe that disappears with its temporary directory.
pub struct Fifo {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Fifo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snd.fifo");
        pcm_fifo::sink::create_fifo(&path).unwrap();

        Fifo { _dir: dir, path }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.path)
    }

    pub fn reader(&self) -> File {
        open_reader(&self.path)
    }
}

impl Default for Fifo {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .unwrap()
}

/// S16_LE stereo at 48 kHz
pub fn stereo_params(buffer_size: u64, period_size: u64) -> HwParams {
    HwParams {
        format: SampleFormat::S16Le,
        channels: 2,
        rate: 48000,
        buffer_size,
        period_size,
    }
}

/// `frames` distinct stereo frames, each holding its index.
pub fn test_pcm(frames: u32) -> Vec<u8> {
    (0..frames).flat_map(|i| i.to_le_bytes()).collect()
}

pub fn player(config: &Config, params: HwParams) -> Player {
    let session = Session::open(config).unwrap();
    session.capabilities().check(&params).unwrap();

    let host = RingHost::with_default_boundary(params).unwrap();
    Player::new(session, host)
}

/// Reads the fifo on a separate thread until `expected` bytes arrived or the
/// timeout passed, starting after `delay`.
pub fn consume(path: &Path, expected: usize, delay: Duration) -> JoinHandle<Vec<u8>> {
    let path = path.to_path_buf();

    std::thread::spawn(move || {
        std::thread::sleep(delay);

        let mut reader = open_reader(&path);
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut out = Vec::with_capacity(expected);
        let mut buf = [0u8; 4096];

        while out.len() < expected && Instant::now() < deadline {
            match reader.read(&mut buf) {
                Ok(n) if n > 0 => out.extend_from_slice(&buf[..n]),
                Ok(_) => std::thread::sleep(Duration::from_millis(1)),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(1))
                }
                Err(e) => panic!("fifo read failed: {e}"),
            }
        }

        out
    })
}

/// Everything currently sitting in the fifo.
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
