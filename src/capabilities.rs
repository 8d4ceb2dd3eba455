use crate::{
    constants::{
        BUFFER_BYTES_MAX, BUFFER_BYTES_MIN, CHANNELS_MAX, CHANNELS_MIN, PERIOD_BYTES_MAX,
        PERIOD_BYTES_MIN, RATE_MAX, RATE_MIN,
    },
    error::{Error, Result},
    format::SampleFormat,
    host::HwParams,
};
use std::ops::RangeInclusive;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    RwInterleaved,
    MmapInterleaved,
}

/// Hardware parameter space the plugin declares to the host.
#[derive(Clone, Debug)]
pub struct Capabilities {
    pub period_bytes: RangeInclusive<u64>,
    pub buffer_bytes: RangeInclusive<u64>,
    pub rate: RangeInclusive<u32>,
    pub channels: RangeInclusive<u32>,
    pub formats: Vec<SampleFormat>,
    pub access: [Access; 2],
}

impl Capabilities {
    pub fn new(formats: Vec<SampleFormat>) -> Self {
        Capabilities {
            period_bytes: PERIOD_BYTES_MIN..=PERIOD_BYTES_MAX,
            buffer_bytes: BUFFER_BYTES_MIN..=BUFFER_BYTES_MAX,
            rate: RATE_MIN..=RATE_MAX,
            channels: CHANNELS_MIN..=CHANNELS_MAX,
            formats,
            access: [Access::RwInterleaved, Access::MmapInterleaved],
        }
    }

    /// Rejects parameters outside the declared space.
    pub fn check(&self, params: &HwParams) -> Result<()> {
        if !self.formats.contains(&params.format) {
            return Err(Error::InvalidArgument(format!(
                "sample format {} is not enabled",
                params.format
            )));
        }

        if !self.channels.contains(&params.channels) {
            return Err(Error::InvalidArgument(format!(
                "{} channels outside {:?}",
                params.channels, self.channels
            )));
        }

        if !self.rate.contains(&params.rate) {
            return Err(Error::InvalidArgument(format!(
                "rate {} Hz outside {:?}",
                params.rate, self.rate
            )));
        }

        let period_bytes = params.checked_frames_to_bytes(params.period_size)? as u64;
        if !self.period_bytes.contains(&period_bytes) {
            return Err(Error::InvalidArgument(format!(
                "period of {period_bytes} bytes outside {:?}",
                self.period_bytes
            )));
        }

        let buffer_bytes = params.checked_frames_to_bytes(params.buffer_size)? as u64;
        if !self.buffer_bytes.contains(&buffer_bytes) {
            return Err(Error::InvalidArgument(format!(
                "buffer of {buffer_bytes} bytes outside {:?}",
                self.buffer_bytes
            )));
        }

        if params.period_size > params.buffer_size {
            return Err(Error::InvalidArgument(
                "period is larger than the buffer".to_string(),
            ));
        }

        Ok(())
    }
}
