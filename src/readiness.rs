use crate::drain::Phase;

/// What the host should watch to learn when to call back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Watch {
    /// The fifo write handle, for writability
    Sink,
    /// The drain timer, for expiry
    Timer,
}

impl Watch {
    pub fn for_phase(phase: Phase) -> Watch {
        // A writable fifo cannot tell that the consumer has read the last bytes
        if phase.is_waiting_empty() {
            Watch::Timer
        } else {
            Watch::Sink
        }
    }

    pub fn events(self) -> libc::c_short {
        match self {
            Watch::Sink => libc::POLLOUT,
            Watch::Timer => libc::POLLIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wakeup {
    /// At least one period of space, wake the host
    Ready,
    /// Some space but less than a period, keep sleeping
    Suppress,
}

impl Wakeup {
    pub fn classify(avail: u64, period_size: u64) -> Wakeup {
        if avail >= period_size {
            Wakeup::Ready
        } else {
            Wakeup::Suppress
        }
    }

    pub fn revents(self) -> libc::c_short {
        match self {
            Wakeup::Ready => libc::POLLOUT,
            Wakeup::Suppress => 0,
        }
    }
}
