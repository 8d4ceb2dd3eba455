//! Unit tests for WAV decoding

#[cfg(test)]
mod tests {
    use crate::error::{Error, Result};
    use crate::format::SampleFormat;
    use crate::wav;
    use hound::{SampleFormat as WavSampleFormat, WavReader, WavSpec, WavWriter};
    use std::io::Cursor;

    fn spec(channels: u16, bits: u16, sample_format: WavSampleFormat) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: bits,
            sample_format,
        }
    }

    fn encode<S: hound::Sample + Copy>(spec: WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in samples {
                writer.write_sample(*sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn decode(bytes: Vec<u8>) -> Result<wav::Pcm> {
        wav::decode(WavReader::new(Cursor::new(bytes)).unwrap())
    }

    #[test]
    fn test_decode_16_bit_stereo() {
        let bytes = encode(spec(2, 16, WavSampleFormat::Int), &[1i16, -2, 0x1234, -32768]);

        let pcm = decode(bytes).unwrap();

        assert_eq!(pcm.format, SampleFormat::S16Le);
        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.rate, 44100);
        assert_eq!(pcm.data, vec![0x01, 0x00, 0xfe, 0xff, 0x34, 0x12, 0x00, 0x80]);
    }

    #[test]
    fn test_decode_8_bit_is_unsigned() {
        let bytes = encode(spec(1, 8, WavSampleFormat::Int), &[0i8, -128, 127]);

        let pcm = decode(bytes).unwrap();

        assert_eq!(pcm.format, SampleFormat::U8);
        assert_eq!(pcm.data, vec![0x80, 0x00, 0xff]);
    }

    #[test]
    fn test_decode_24_bit_is_packed() {
        let bytes = encode(spec(1, 24, WavSampleFormat::Int), &[0x123456i32, -1]);

        let pcm = decode(bytes).unwrap();

        assert_eq!(pcm.format, SampleFormat::S24_3Le);
        assert_eq!(pcm.data, vec![0x56, 0x34, 0x12, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_decode_float() {
        let bytes = encode(spec(1, 32, WavSampleFormat::Float), &[0.5f32]);

        let pcm = decode(bytes).unwrap();

        assert_eq!(pcm.format, SampleFormat::FloatLe);
        assert_eq!(pcm.data, 0.5f32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_decode_32_bit_int() {
        let bytes = encode(spec(2, 32, WavSampleFormat::Int), &[i32::MIN, 7]);

        let pcm = decode(bytes).unwrap();

        assert_eq!(pcm.format, SampleFormat::S32Le);
        assert_eq!(pcm.data, vec![0, 0, 0, 0x80, 7, 0, 0, 0]);
    }

    #[test]
    fn test_missing_file_is_a_wav_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = wav::open(dir.path().join("missing.wav"));

        assert!(matches!(result, Err(Error::Wav(_))));
    }
}
