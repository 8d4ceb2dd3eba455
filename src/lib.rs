//! pcm-fifo library crate
//!
//! Streams a host-owned PCM ring buffer into a named pipe while reporting
//! playback progress the way the host's drain and underrun logic expects.
//! The player binary is in main.rs.

#[macro_use]
extern crate log;

pub mod capabilities;
pub mod config;
pub mod constants;
pub mod drain;
pub mod error;
pub mod format;
pub mod host;
pub mod player;
pub mod position;
pub mod readiness;
pub mod ring;
pub mod session;
pub mod sink;
pub mod timer;
pub mod transfer;
pub mod wav;
pub mod writer;

#[cfg(test)]
mod test_util;

// Test modules
#[cfg(test)]
mod capabilities_tests;
#[cfg(test)]
mod timer_tests;
#[cfg(test)]
mod wav_tests;
#[cfg(test)]
mod writer_tests;
