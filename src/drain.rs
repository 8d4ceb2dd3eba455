//! Engine-side view of the stream, derived from the host state plus drain
//! progress.
//!
//! ```text
//! Idle -> Running -> Draining(Active) -> Draining(WaitEmpty) -> Idle
//!            \-> Overrun (until the next prepare)
//! ```

use crate::host::StreamState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Draining(Drain),
    Overrun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drain {
    /// Ring contents are still being moved into the fifo
    Active,
    /// Everything is in the fifo, the pointer is held back one frame until
    /// the consumer has read it all
    WaitEmpty,
}

impl Phase {
    /// Next phase given the state the host reports on entry to a callback.
    pub fn follow(self, state: StreamState) -> Phase {
        match (self, state) {
            (Phase::Overrun, _) | (_, StreamState::Xrun) => Phase::Overrun,
            (_, StreamState::Running) => Phase::Running,
            (Phase::Draining(drain), StreamState::Draining) => Phase::Draining(drain),
            (_, StreamState::Draining) => Phase::Draining(Drain::Active),
            _ => Phase::Idle,
        }
    }

    pub fn is_transferring(self) -> bool {
        matches!(self, Phase::Running | Phase::Draining(Drain::Active))
    }

    pub fn is_waiting_empty(self) -> bool {
        self == Phase::Draining(Drain::WaitEmpty)
    }
}
