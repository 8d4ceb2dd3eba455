//! PCM sample formats understood by the fifo plugin.
//!
//! The engine never interprets samples. Formats matter for two things only:
//! the number of bytes in a frame and the bit pattern of silence written as
//! lead-in.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum SampleFormat {
    S8,
    U8,
    S16Le,
    S16Be,
    U16Le,
    U16Be,
    S24Le,
    S24Be,
    U24Le,
    U24Be,
    S24_3Le,
    S24_3Be,
    U24_3Le,
    U24_3Be,
    S32Le,
    S32Be,
    U32Le,
    U32Be,
    FloatLe,
    FloatBe,
    Float64Le,
    Float64Be,
    S20Le,
    S20Be,
    U20Le,
    U20Be,
    S20_3Le,
    S20_3Be,
    U20_3Le,
    U20_3Be,
    S18_3Le,
    S18_3Be,
    U18_3Le,
    U18_3Be,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Signed,
    Unsigned,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

/// Name, physical bytes, significant bits, encoding, byte order
type Layout = (&'static str, usize, u32, Encoding, Endian);

impl SampleFormat {
    /// Formats offered when the configuration lists none, or asks for the
    /// list to be appended.
    pub const DEFAULTS: [SampleFormat; 34] = [
        SampleFormat::S8,
        SampleFormat::U8,
        SampleFormat::S16Le,
        SampleFormat::S16Be,
        SampleFormat::U16Le,
        SampleFormat::U16Be,
        SampleFormat::S24Le,
        SampleFormat::S24Be,
        SampleFormat::U24Le,
        SampleFormat::U24Be,
        SampleFormat::S24_3Le,
        SampleFormat::S24_3Be,
        SampleFormat::U24_3Le,
        SampleFormat::U24_3Be,
        SampleFormat::S32Le,
        SampleFormat::S32Be,
        SampleFormat::U32Le,
        SampleFormat::U32Be,
        SampleFormat::FloatLe,
        SampleFormat::FloatBe,
        SampleFormat::Float64Le,
        SampleFormat::Float64Be,
        SampleFormat::S20Le,
        SampleFormat::S20Be,
        SampleFormat::U20Le,
        SampleFormat::U20Be,
        SampleFormat::S20_3Le,
        SampleFormat::S20_3Be,
        SampleFormat::U20_3Le,
        SampleFormat::U20_3Be,
        SampleFormat::S18_3Le,
        SampleFormat::S18_3Be,
        SampleFormat::U18_3Le,
        SampleFormat::U18_3Be,
    ];

    fn layout(self) -> Layout {
        use Encoding::*;
        use Endian::*;

        match self {
            SampleFormat::S8 => ("S8", 1, 8, Signed, Little),
            SampleFormat::U8 => ("U8", 1, 8, Unsigned, Little),
            SampleFormat::S16Le => ("S16_LE", 2, 16, Signed, Little),
            SampleFormat::S16Be => ("S16_BE", 2, 16, Signed, Big),
            SampleFormat::U16Le => ("U16_LE", 2, 16, Unsigned, Little),
            SampleFormat::U16Be => ("U16_BE", 2, 16, Unsigned, Big),
            SampleFormat::S24Le => ("S24_LE", 4, 24, Signed, Little),
            SampleFormat::S24Be => ("S24_BE", 4, 24, Signed, Big),
            SampleFormat::U24Le => ("U24_LE", 4, 24, Unsigned, Little),
            SampleFormat::U24Be => ("U24_BE", 4, 24, Unsigned, Big),
            SampleFormat::S24_3Le => ("S24_3LE", 3, 24, Signed, Little),
            SampleFormat::S24_3Be => ("S24_3BE", 3, 24, Signed, Big),
            SampleFormat::U24_3Le => ("U24_3LE", 3, 24, Unsigned, Little),
            SampleFormat::U24_3Be => ("U24_3BE", 3, 24, Unsigned, Big),
            SampleFormat::S32Le => ("S32_LE", 4, 32, Signed, Little),
            SampleFormat::S32Be => ("S32_BE", 4, 32, Signed, Big),
            SampleFormat::U32Le => ("U32_LE", 4, 32, Unsigned, Little),
            SampleFormat::U32Be => ("U32_BE", 4, 32, Unsigned, Big),
            SampleFormat::FloatLe => ("FLOAT_LE", 4, 32, Float, Little),
            SampleFormat::FloatBe => ("FLOAT_BE", 4, 32, Float, Big),
            SampleFormat::Float64Le => ("FLOAT64_LE", 8, 64, Float, Little),
            SampleFormat::Float64Be => ("FLOAT64_BE", 8, 64, Float, Big),
            SampleFormat::S20Le => ("S20_LE", 4, 20, Signed, Little),
            SampleFormat::S20Be => ("S20_BE", 4, 20, Signed, Big),
            SampleFormat::U20Le => ("U20_LE", 4, 20, Unsigned, Little),
            SampleFormat::U20Be => ("U20_BE", 4, 20, Unsigned, Big),
            SampleFormat::S20_3Le => ("S20_3LE", 3, 20, Signed, Little),
            SampleFormat::S20_3Be => ("S20_3BE", 3, 20, Signed, Big),
            SampleFormat::U20_3Le => ("U20_3LE", 3, 20, Unsigned, Little),
            SampleFormat::U20_3Be => ("U20_3BE", 3, 20, Unsigned, Big),
            SampleFormat::S18_3Le => ("S18_3LE", 3, 18, Signed, Little),
            SampleFormat::S18_3Be => ("S18_3BE", 3, 18, Signed, Big),
            SampleFormat::U18_3Le => ("U18_3LE", 3, 18, Unsigned, Little),
            SampleFormat::U18_3Be => ("U18_3BE", 3, 18, Unsigned, Big),
        }
    }

    pub fn name(self) -> &'static str {
        self.layout().0
    }

    /// Bytes occupied by one sample in memory
    pub fn physical_bytes(self) -> usize {
        self.layout().1
    }

    pub fn significant_bits(self) -> u32 {
        self.layout().2
    }

    pub fn is_unsigned(self) -> bool {
        self.layout().3 == Encoding::Unsigned
    }

    /// Encoded bytes of a single silent sample.
    ///
    /// Signed and float formats are silent at zero, unsigned formats at the
    /// mid-point of their significant bits.
    pub fn silence_sample(self) -> Vec<u8> {
        let (_, bytes, bits, encoding, endian) = self.layout();
        let value = match encoding {
            Encoding::Unsigned => 1u64 << (bits - 1),
            Encoding::Signed | Encoding::Float => 0,
        };

        let mut buf = [0u8; 8];
        match endian {
            Endian::Little => encode::<LittleEndian>(&mut buf, bytes, value),
            Endian::Big => encode::<BigEndian>(&mut buf, bytes, value),
        }
        buf[..bytes].to_vec()
    }

    /// `samples` silent samples, ready to be written to the sink.
    pub fn silence(self, samples: usize) -> Result<Vec<u8>> {
        let pattern = self.silence_sample();
        let len = samples
            .checked_mul(pattern.len())
            .ok_or(Error::OutOfMemory)?;

        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory)?;

        if pattern.iter().all(|b| *b == 0) {
            out.resize(len, 0);
        } else {
            for _ in 0..samples {
                out.extend_from_slice(&pattern);
            }
        }

        Ok(out)
    }
}

fn encode<B: ByteOrder>(buf: &mut [u8; 8], bytes: usize, value: u64) {
    match bytes {
        1 => buf[0] = value as u8,
        2 => B::write_u16(&mut buf[..2], value as u16),
        3 => B::write_u24(&mut buf[..3], value as u32),
        4 => B::write_u32(&mut buf[..4], value as u32),
        _ => B::write_u64(&mut buf[..8], value),
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SampleFormat::DEFAULTS
            .iter()
            .copied()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("{s} is not a valid sample format")))
    }
}

impl TryFrom<String> for SampleFormat {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SampleFormat> for String {
    fn from(format: SampleFormat) -> Self {
        format.name().to_string()
    }
}
