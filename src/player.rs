//! Drives a [`Session`] the way an audio framework would: fill the ring,
//! commit, sleep on the descriptor the session hands out, drain at the end.

use crate::{
    error::{Error, Result},
    host::{Host, StreamState},
    ring::RingHost,
    session::Session,
};
use std::{os::fd::RawFd, time::Duration};
use tokio::io::{unix::AsyncFd, Interest};

const MIN_WAIT: Duration = Duration::from_millis(1);

pub struct Player {
    // Dropped before the session so the registration goes before its descriptor
    watched: Option<AsyncFd<RawFd>>,
    session: Session,
    host: RingHost,
}

impl Player {
    pub fn new(session: Session, host: RingHost) -> Self {
        Player {
            watched: None,
            session,
            host,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn host(&self) -> &RingHost {
        &self.host
    }

    /// Streams `pcm` through the ring and waits until the consumer has read
    /// all of it.
    pub async fn play(&mut self, pcm: &[u8]) -> Result<()> {
        self.host.prepare();
        self.session.prepare(&self.host)?;

        let params = self.host.params().clone();
        let whole_frames = pcm.len() - pcm.len() % params.frame_bytes();
        let total = params.bytes_to_frames(whole_frames);

        // The last period is committed without a transfer so the drain has
        // frames to hold back until the fifo runs dry
        let last = params.frames_to_bytes(total.min(params.period_size));
        let (body, last) = pcm[..whole_frames].split_at(whole_frames - last);

        info!(
            "Streaming {total} frames of {} x {} at {} Hz",
            params.channels, params.format, params.rate
        );

        let mut rest = body;
        while !rest.is_empty() {
            let offset = self.host.appl_ptr() % params.buffer_size;
            let frames = self.host.write(rest);

            if frames > 0 {
                rest = &rest[params.frames_to_bytes(frames)..];
                self.session.transfer(&self.host, offset, frames)?;
            }

            // Start once the ring is full, like a start threshold of one buffer
            if self.host.state() == StreamState::Prepared && self.host.avail() < params.period_size
            {
                self.session.start(&mut self.host)?;
            }

            if !rest.is_empty() && self.host.avail() < params.period_size {
                self.wait().await?;
            }
        }

        if self.host.state() == StreamState::Prepared {
            self.session.start(&mut self.host)?;
        }

        let last_frames = params.bytes_to_frames(last.len());
        while self.host.avail() < last_frames {
            self.wait().await?;
        }
        self.host.write(last);

        self.drain().await
    }

    async fn drain(&mut self) -> Result<()> {
        debug!("Draining");
        self.host.set_state(StreamState::Draining)?;

        while self.host.state() == StreamState::Draining {
            self.wait().await?;
        }

        debug!("Drained, stopping");
        self.session.stop(&self.host)
    }

    /// Abandons playback without draining.
    pub fn stop(&mut self) -> Result<()> {
        self.host.set_state(StreamState::Setup)?;
        self.session.stop(&self.host)
    }

    /// One poll cycle: wait on the descriptor the session names, then let it
    /// translate what happened.
    async fn wait(&mut self) -> Result<libc::c_short> {
        let mut pfds = [libc::pollfd {
            fd: -1,
            events: 0,
            revents: 0,
        }];
        self.session.poll_descriptors(&self.host, &mut pfds)?;

        pfds[0].revents = self.ready(pfds[0]).await?;
        self.session.poll_revents(&mut self.host, &pfds)
    }

    async fn ready(&mut self, pfd: libc::pollfd) -> Result<libc::c_short> {
        let interest = if pfd.events & libc::POLLOUT != 0 {
            Interest::WRITABLE
        } else {
            Interest::READABLE
        };

        if self.watched.as_ref().map(|afd| *afd.get_ref()) != Some(pfd.fd) {
            // Deregister the previous descriptor before registering the next
            self.watched = None;
            let afd = AsyncFd::with_interest(pfd.fd, interest)
                .map_err(|e| Error::io("failed to watch poll descriptor", e))?;
            self.watched = Some(afd);
        }

        let Some(afd) = self.watched.as_ref() else {
            return Ok(0);
        };

        match tokio::time::timeout(self.period(), afd.ready(interest)).await {
            Ok(Ok(mut guard)) => {
                let ready = guard.ready();
                guard.clear_ready();

                let mut revents = 0;
                if ready.is_writable() {
                    revents |= libc::POLLOUT;
                }
                if ready.is_readable() {
                    revents |= libc::POLLIN;
                }
                Ok(revents)
            }
            Ok(Err(e)) => Err(Error::io("failed to wait on poll descriptor", e)),
            // Nothing happened within a period, let the session resync anyway
            Err(_) => Ok(0),
        }
    }

    fn period(&self) -> Duration {
        let params = self.host.params();
        Duration::from_secs_f64(params.period_size as f64 / params.rate.max(1) as f64).max(MIN_WAIT)
    }

    pub fn close(self) {
        let Player {
            session, watched, ..
        } = self;

        // The registration must go before the descriptor it refers to
        drop(watched);
        session.close();
    }
}
