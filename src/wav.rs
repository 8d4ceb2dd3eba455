//! WAV input for the player, decoded with hound into interleaved
//! little-endian PCM bytes.

use crate::{
    error::{Error, Result},
    format::SampleFormat,
};
use byteorder::{LittleEndian, WriteBytesExt};
use hound::{SampleFormat as WavSampleFormat, WavReader};
use std::{io::Read, path::Path};

#[derive(Clone, Debug)]
pub struct Pcm {
    pub format: SampleFormat,
    pub channels: u32,
    pub rate: u32,
    pub data: Vec<u8>,
}

pub fn open(path: impl AsRef<Path>) -> Result<Pcm> {
    decode(WavReader::open(path)?)
}

pub fn decode<R: Read>(mut reader: WavReader<R>) -> Result<Pcm> {
    let spec = reader.spec();

    let (format, data) = match (spec.sample_format, spec.bits_per_sample) {
        // hound hands 8-bit samples back signed, the file stores them offset
        (WavSampleFormat::Int, 8) => (
            SampleFormat::U8,
            collect(&mut reader, 1, |out, s: i8| out.write_u8((s as i16 + 128) as u8))?,
        ),
        (WavSampleFormat::Int, 16) => (
            SampleFormat::S16Le,
            collect(&mut reader, 2, |out, s: i16| out.write_i16::<LittleEndian>(s))?,
        ),
        (WavSampleFormat::Int, 24) => (
            SampleFormat::S24_3Le,
            collect(&mut reader, 3, |out, s: i32| out.write_i24::<LittleEndian>(s))?,
        ),
        (WavSampleFormat::Int, 32) => (
            SampleFormat::S32Le,
            collect(&mut reader, 4, |out, s: i32| out.write_i32::<LittleEndian>(s))?,
        ),
        (WavSampleFormat::Float, 32) => (
            SampleFormat::FloatLe,
            collect(&mut reader, 4, |out, s: f32| out.write_f32::<LittleEndian>(s))?,
        ),
        (sample_format, bits) => {
            return Err(Error::InvalidArgument(format!(
                "unsupported wav encoding: {bits} bit {sample_format:?}"
            )))
        }
    };

    Ok(Pcm {
        format,
        channels: spec.channels as u32,
        rate: spec.sample_rate,
        data,
    })
}

fn collect<R, S, F>(reader: &mut WavReader<R>, width: usize, mut put: F) -> Result<Vec<u8>>
where
    R: Read,
    S: hound::Sample,
    F: FnMut(&mut Vec<u8>, S) -> std::io::Result<()>,
{
    let mut data = Vec::with_capacity(reader.len() as usize * width);

    for sample in reader.samples::<S>() {
        put(&mut data, sample?).map_err(|e| Error::io("failed to encode sample", e))?;
    }

    Ok(data)
}
