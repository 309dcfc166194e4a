//! WAV decoding and encoding collaborator.
//!
//! Decoding accepts integer PCM (8/16/24/32 bit) and 32-bit float WAV and
//! normalizes integer samples by `2^(bits - 1)`. Encoding always emits 16-bit
//! PCM regardless of the input format: samples are clipped to [-1.0, 1.0] and
//! scaled by `i16::MAX`.

use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::AudioBuffer;
use crate::error::CodecError;

/// Bit depth of every encoded output file.
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 16;

/// Decode an in-memory WAV file into an [`AudioBuffer`].
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer, CodecError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    decode_reader(reader)
}

/// Read and decode a WAV file from disk.
pub fn read_wav(path: &Path) -> Result<AudioBuffer, CodecError> {
    let reader = WavReader::open(path)?;
    let buffer = decode_reader(reader)?;
    log::debug!(
        "[WavCodec] Decoded {}: {} channel(s), {} frames @ {} Hz",
        path.display(),
        buffer.channel_count(),
        buffer.frames(),
        buffer.sample_rate()
    );
    Ok(buffer)
}

/// Encode a buffer as a 16-bit PCM WAV file held in memory.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, CodecError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, output_spec(buffer)?)?;
        for sample in buffer.to_interleaved() {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Encode a buffer as a 16-bit PCM WAV file on disk.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<(), CodecError> {
    let mut writer = WavWriter::create(path, output_spec(buffer)?)?;
    for sample in buffer.to_interleaved() {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;
    log::debug!(
        "[WavCodec] Wrote {} ({} frames, {} channel(s))",
        path.display(),
        buffer.frames(),
        buffer.channel_count()
    );
    Ok(())
}

fn output_spec(buffer: &AudioBuffer) -> Result<WavSpec, CodecError> {
    let channels = u16::try_from(buffer.channel_count()).map_err(|_| CodecError::InvalidLayout {
        reason: format!("{} channels exceed the WAV limit", buffer.channel_count()),
    })?;

    Ok(WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    })
}

fn to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}

fn decode_reader<R: Read>(mut reader: WavReader<R>) -> Result<AudioBuffer, CodecError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(CodecError::InvalidLayout {
            reason: "WAV header declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => match spec.bits_per_sample {
            32 => reader
                .samples::<f32>()
                .map(|sample| sample.map(f64::from))
                .collect::<Result<_, _>>()?,
            bits => {
                return Err(CodecError::UnsupportedFormat {
                    bits,
                    format: "float",
                })
            }
        },
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
            match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .map(|sample| sample.map(|v| v as f64 * scale))
                    .collect::<Result<_, _>>()?,
                16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|v| v as f64 * scale))
                    .collect::<Result<_, _>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f64 * scale))
                    .collect::<Result<_, _>>()?,
                bits => {
                    return Err(CodecError::UnsupportedFormat {
                        bits,
                        format: "integer",
                    })
                }
            }
        }
    };

    AudioBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate).map_err(
        |err| CodecError::InvalidLayout {
            reason: err.to_string(),
        },
    )
}
