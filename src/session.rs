//! One opened playback stream and the callbacks the host drives it through.
//!
//! Callbacks made under the host lock (`start`, `transfer`, `stop`,
//! `pointer`) may move the hardware pointer. `prepare`, `close` and
//! `poll_descriptors` run outside it and only reset or read engine state.

use crate::{
    capabilities::Capabilities,
    config::{Config, Verbosity},
    constants::DRAIN_POLL_PERIOD,
    drain::{Drain, Phase},
    error::{Error, Result},
    host::{Host, StreamState},
    position::{playback_avail, HwPtr, Tracker},
    readiness::{Wakeup, Watch},
    sink::Sink,
    timer::Timer,
    writer::ChunkWriter,
};

#[derive(Debug)]
pub struct Session {
    sink: Sink,
    timer: Timer,
    tracker: Tracker,
    phase: Phase,
    clear_on_drop: bool,
    lead_in_frames: u32,
    verbosity: Verbosity,
    capabilities: Capabilities,
}

impl Session {
    /// Opens both fifo handles and the drain timer.
    ///
    /// Nothing is left open when this fails.
    pub fn open(config: &Config) -> Result<Session> {
        config.validate()?;

        let sink = Sink::open(&config.fifo)?;
        let timer = Timer::create()?;
        let verbosity = config.verbosity();

        if verbosity.enabled() {
            debug!("Opened fifo {}", config.fifo.display());
        }

        Ok(Session {
            sink,
            timer,
            tracker: Tracker::new(),
            phase: Phase::Idle,
            clear_on_drop: config.clear_on_drop,
            lead_in_frames: config.lead_in_frames,
            verbosity,
            capabilities: Capabilities::new(config.formats()),
        })
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hw_ptr(&self) -> HwPtr {
        self.tracker.ptr()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    fn writer<H: Host + ?Sized>(&self, host: &H) -> ChunkWriter {
        ChunkWriter::new(host.params().frame_bytes(), self.verbosity)
    }

    fn sync_phase<H: Host + ?Sized>(&mut self, host: &H) {
        let next = self.phase.follow(host.state());
        if self.phase.is_waiting_empty() && !next.is_waiting_empty() {
            self.disarm_timer();
        }
        self.phase = next;
    }

    fn disarm_timer(&mut self) {
        if let Err(e) = self.timer.disarm() {
            if self.verbosity.enabled() {
                error!("Failed to disarm the drain timer: {e}");
            }
        }
    }

    fn advance<H: Host + ?Sized>(&mut self, host: &H) -> Result<()> {
        let writer = self.writer(host);
        let was_waiting = self.phase.is_waiting_empty();

        let sink = self.sink.writer()?;
        let result = self.tracker.advance(&mut self.phase, sink, host, &writer);

        if !was_waiting && self.phase.is_waiting_empty() {
            // poll_descriptors retries if this fails
            if let Err(e) = self.timer.arm(DRAIN_POLL_PERIOD) {
                if self.verbosity.enabled() {
                    error!("Failed to arm the drain timer: {e}");
                }
            }
        }

        result
    }

    pub fn prepare<H: Host + ?Sized>(&mut self, host: &H) -> Result<()> {
        if self.verbosity.enabled() {
            debug!("Prepare called. Stream state is {}", host.state().name());
        }

        let disarmed = self.timer.disarm();

        if !self.sink.is_open() {
            return Err(Error::BadDescriptor);
        }

        let params = host.params();
        if params.buffer_size == 0 || params.frame_bytes() == 0 {
            return Err(Error::InvalidArgument(
                "empty ring buffer or frame".to_string(),
            ));
        }

        let boundary = host.boundary()?;
        if boundary < params.buffer_size {
            return Err(Error::InvalidArgument(format!(
                "boundary {boundary} is smaller than the buffer"
            )));
        }

        // The pointer is handed to the host as a signed frame count
        if boundary > i64::MAX as u64 {
            return Err(Error::InvalidArgument(format!(
                "boundary {boundary} does not fit a signed pointer"
            )));
        }

        self.tracker.reset(host.hw_ptr(), boundary);
        self.phase = Phase::Idle;

        if self.verbosity.enabled() {
            debug!("Boundary of {} is {boundary} frames", self.sink.path().display());
        }

        disarmed
    }

    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if self.verbosity.enabled() {
            debug!("Start called. Stream state is {}", host.state().name());
        }

        // Running before the first advance, or it would not transfer
        host.set_state(StreamState::Running)?;
        self.sync_phase(host);

        if self.lead_in_frames > 0 {
            self.write_lead_in(host)?;
        }

        self.advance(host)
    }

    /// Primes the fifo with silence so the first pointer query does not find
    /// it empty.
    fn write_lead_in<H: Host + ?Sized>(&mut self, host: &H) -> Result<()> {
        let params = host.params();
        let samples = self.lead_in_frames as usize * params.channels as usize;
        let silence = params.format.silence(samples)?;

        let writer = self.writer(host);
        let sink = self.sink.writer()?;

        match writer.write(sink, &silence) {
            Ok(frames) => {
                if self.verbosity.enabled() {
                    debug!("Wrote {frames} frames of lead-in silence");
                }
            }
            Err(e) => {
                if self.verbosity.enabled() {
                    error!("Failed to write lead-in silence: {e}");
                }
            }
        }

        Ok(())
    }

    /// Mmap commit notification. Moves whatever is buffered and reports the
    /// requested size as consumed.
    pub fn transfer<H: Host + ?Sized>(&mut self, host: &H, offset: u64, size: u64) -> Result<u64> {
        if self.verbosity.enabled() {
            debug!(
                "Transfer called for {size} frames at offset {offset}. Stream state is {}",
                host.state().name()
            );
        }

        self.sync_phase(host);
        self.advance(host)?;

        Ok(size)
    }

    pub fn stop<H: Host + ?Sized>(&mut self, host: &H) -> Result<()> {
        if self.verbosity.enabled() {
            debug!("Stop called. Stream state is {}", host.state().name());
        }

        let cleared = if !self.sink.is_open() {
            Err(Error::BrokenPipe)
        } else if self.clear_on_drop {
            let chunk_bytes = self.writer(host).chunk_bytes();
            self.sink.clear(chunk_bytes).map(|bytes| {
                if self.verbosity.enabled() {
                    debug!(
                        "Cleared {bytes} bytes from fifo {}",
                        self.sink.path().display()
                    );
                }
            })
        } else {
            Ok(())
        };

        let disarmed = self.timer.disarm();

        if self.phase != Phase::Overrun {
            self.phase = Phase::Idle;
        }

        cleared.and(disarmed)
    }

    /// Current hardware pointer, moving data into the fifo on the way.
    ///
    /// While waiting for a drain, returns the held-back pointer until the fifo
    /// has no unread bytes, then the halted sentinel.
    pub fn pointer<H: Host + ?Sized>(&mut self, host: &H) -> Result<u64> {
        if self.verbosity.detailed() {
            trace!("Pointer called. Stream state is {}", host.state().name());
        }

        if !self.sink.is_open() {
            self.tracker.halt();
            return Err(Error::BadDescriptor);
        }

        self.sync_phase(host);

        match self.phase {
            Phase::Overrun => {
                self.tracker.halt();
                return Err(Error::BrokenPipe);
            }
            Phase::Draining(Drain::WaitEmpty) => self.check_drained()?,
            Phase::Running | Phase::Draining(Drain::Active) => {
                if let Err(e) = self.advance(host) {
                    if self.verbosity.enabled() {
                        error!("Unable to advance the pointer: {e}");
                    }
                }
            }
            Phase::Idle => {}
        }

        if self.verbosity.detailed() {
            trace!(
                "Moving pointer from {} to {}. Application pointer is {}",
                host.hw_ptr(),
                self.tracker.ptr().raw(),
                host.appl_ptr()
            );
        }

        self.tracker.position()
    }

    fn check_drained(&mut self) -> Result<()> {
        match self.sink.has_unread() {
            Err(e) => {
                if self.verbosity.enabled() {
                    error!("{e}");
                }
                self.tracker.halt();
                Err(Error::BrokenPipe)
            }
            Ok(false) => {
                if self.verbosity.detailed() {
                    trace!("Draining complete for fifo {}", self.sink.path().display());
                }
                self.tracker.halt();
                self.disarm_timer();
                self.phase = Phase::Idle;
                Ok(())
            }
            Ok(true) => {
                if self.verbosity.detailed() {
                    trace!("Waiting for fifo {} to drain", self.sink.path().display());
                }
                Ok(())
            }
        }
    }

    pub fn poll_descriptor_count(&self) -> usize {
        1
    }

    /// Fills the single descriptor the host should wait on.
    pub fn poll_descriptors<H: Host + ?Sized>(
        &mut self,
        host: &H,
        pfds: &mut [libc::pollfd],
    ) -> Result<usize> {
        if self.verbosity.detailed() {
            trace!("Poll descriptors called. Stream state is {}", host.state().name());
        }

        let count = pfds.len();
        let [pfd] = pfds else {
            return Err(Error::InvalidArgument(format!(
                "expected 1 poll descriptor, got {count}"
            )));
        };

        let watch = Watch::for_phase(self.phase);
        let fd = match watch {
            Watch::Timer => {
                if !self.timer.is_armed() {
                    self.timer.arm(DRAIN_POLL_PERIOD)?;
                }
                self.timer.fd()
            }
            Watch::Sink => self.sink.write_fd(),
        }
        .ok_or(Error::BadDescriptor)?;

        *pfd = libc::pollfd {
            fd,
            events: watch.events(),
            revents: 0,
        };

        Ok(1)
    }

    /// Turns the raw events seen on our descriptor into what the host should
    /// act on.
    pub fn poll_revents<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pfds: &[libc::pollfd],
    ) -> Result<libc::c_short> {
        if self.verbosity.detailed() {
            trace!("Revents called. Stream state is {}", host.state().name());
        }

        let [pfd] = pfds else {
            return Err(Error::InvalidArgument(format!(
                "expected 1 poll descriptor, got {}",
                pfds.len()
            )));
        };

        let is_timer = self.timer.fd() == Some(pfd.fd);
        if !is_timer && self.sink.write_fd() != Some(pfd.fd) {
            return Err(Error::InvalidArgument(format!(
                "unrecognised poll descriptor {}",
                pfd.fd
            )));
        }

        if is_timer && pfd.revents & libc::POLLIN != 0 {
            self.timer.acknowledge()?;
        }

        match host.state() {
            StreamState::Running | StreamState::Draining => {
                // Hardware sync, then measure space against the freshly synced pointer
                let reported = self.pointer(&*host).ok();
                host.sync_hw_ptr(reported)?;

                let params = host.params();
                let avail = playback_avail(
                    host.hw_ptr(),
                    host.appl_ptr(),
                    params.buffer_size,
                    host.boundary()?,
                );
                let wakeup = Wakeup::classify(avail, params.period_size);

                if self.verbosity.detailed() {
                    trace!("{avail} frames available, {wakeup:?}");
                }

                Ok(wakeup.revents())
            }
            _ => Ok(pfd.revents),
        }
    }

    /// Releases every handle and ends the session.
    pub fn close(mut self) {
        if self.verbosity.enabled() {
            debug!("Close called, phase is {:?}", self.phase);
        }

        self.release();
    }

    /// Closes the fifo handles and the timer. Safe to call any number of
    /// times; later callbacks fail with a bad descriptor.
    pub fn release(&mut self) {
        self.sink.close();
        self.timer.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}
