//! Minimal WAV reading and writing for the CLI and offline use.
//!
//! Reads PCM16, PCM24 and 32-bit float, mono or stereo; writes PCM16 or
//! 32-bit float. Nothing here touches the real-time path.

use std::io::Write;

use crate::core::types::{AudioBuffer, Channels, Sample};
use crate::error::SplitterError;

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;

/// Parsed `fmt ` chunk fields we care about.
struct FmtChunk {
    format_code: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Reads a WAV file from a byte slice.
pub fn read_wav(data: &[u8]) -> Result<AudioBuffer, SplitterError> {
    if data.len() < 44 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(SplitterError::InvalidFormat(
            "not a RIFF/WAVE file".to_string(),
        ));
    }

    let mut cursor = 12;
    let mut fmt: Option<FmtChunk> = None;
    let mut audio_data: &[u8] = &[];

    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        let chunk_size = read_u32_le(data, cursor + 4) as usize;
        cursor += 8;

        match chunk_id {
            b"fmt " => {
                if cursor + 16 > data.len() {
                    return Err(SplitterError::InvalidFormat(
                        "fmt chunk too short".to_string(),
                    ));
                }
                fmt = Some(FmtChunk {
                    format_code: read_u16_le(data, cursor),
                    num_channels: read_u16_le(data, cursor + 2),
                    sample_rate: read_u32_le(data, cursor + 4),
                    // skip byte rate and block align
                    bits_per_sample: read_u16_le(data, cursor + 14),
                });
            }
            b"data" => {
                let end = (cursor + chunk_size).min(data.len());
                audio_data = &data[cursor..end];
            }
            _ => {}
        }

        cursor += chunk_size;
        // WAV chunks are word-aligned
        if chunk_size % 2 == 1 {
            cursor += 1;
        }
    }

    let fmt = fmt.ok_or_else(|| SplitterError::InvalidFormat("no fmt chunk".to_string()))?;
    if fmt.sample_rate == 0 {
        return Err(SplitterError::InvalidSampleRate(fmt.sample_rate));
    }
    let channels = Channels::from_count(fmt.num_channels)?;

    let samples: Vec<Sample> = match (fmt.format_code, fmt.bits_per_sample) {
        (WAV_FORMAT_PCM, 16) => audio_data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
        (WAV_FORMAT_PCM, 24) => audio_data
            .chunks_exact(3)
            .map(|b| {
                let raw = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
                // Sign extend from 24 bits
                let raw = (raw << 8) >> 8;
                raw as f32 / 8_388_608.0
            })
            .collect(),
        (WAV_FORMAT_IEEE_FLOAT, 32) => audio_data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        (format, bits) => {
            return Err(SplitterError::InvalidFormat(format!(
                "unsupported WAV encoding: format {} at {} bits",
                format, bits
            )))
        }
    };

    AudioBuffer::new(samples, channels, fmt.sample_rate)
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: &str) -> Result<AudioBuffer, SplitterError> {
    let data = std::fs::read(path)
        .map_err(|e| SplitterError::IoError(format!("{}: {}", path, e)))?;
    read_wav(&data)
}

fn write_header(out: &mut Vec<u8>, buffer: &AudioBuffer, format: u16, bits: u16) {
    let num_channels = buffer.channels.count() as u16;
    let bytes_per_sample = (bits / 8) as u32;
    let byte_rate = buffer.sample_rate * num_channels as u32 * bytes_per_sample;
    let block_align = num_channels * (bits / 8);
    let data_size = buffer.data.len() as u32 * bytes_per_sample;

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
}

/// Serializes an audio buffer as a 16-bit PCM WAV file.
pub fn write_wav_16bit(buffer: &AudioBuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(44 + buffer.data.len() * 2);
    write_header(&mut out, buffer, WAV_FORMAT_PCM, 16);
    for &sample in &buffer.data {
        // Same 32768 scale as the reader; +1.0 clips to i16::MAX.
        let scaled = (f64::from(sample) * 32768.0).round();
        let clamped = scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        out.extend_from_slice(&clamped.to_le_bytes());
    }
    out
}

/// Serializes an audio buffer as a 32-bit float WAV file.
pub fn write_wav_float(buffer: &AudioBuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(44 + buffer.data.len() * 4);
    write_header(&mut out, buffer, WAV_FORMAT_IEEE_FLOAT, 32);
    for &sample in &buffer.data {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Writes a WAV file to disk (16-bit PCM).
pub fn write_wav_file_16bit(path: &str, buffer: &AudioBuffer) -> Result<(), SplitterError> {
    write_file(path, &write_wav_16bit(buffer))
}

/// Writes a WAV file to disk (32-bit float).
pub fn write_wav_file_float(path: &str, buffer: &AudioBuffer) -> Result<(), SplitterError> {
    write_file(path, &write_wav_float(buffer))
}

fn write_file(path: &str, data: &[u8]) -> Result<(), SplitterError> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| SplitterError::IoError(format!("{}: {}", path, e)))?;
    file.write_all(data)
        .map_err(|e| SplitterError::IoError(format!("{}: {}", path, e)))?;
    Ok(())
}
