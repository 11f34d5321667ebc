//! Framing of the synthesizer's raw output as 16-bit PCM.
//!
//! The engine emits a canonical 44-byte RIFF/WAVE header followed by
//! little-endian sample data. Only the fields below are read; everything
//! else in the header is trusted.

use std::path::Path;

use crate::error::NarrationError;

/// Size of the canonical header; sample data starts right after it.
pub const HEADER_LEN: usize = 44;

const CHANNELS_OFFSET: usize = 22;
const SAMPLE_RATE_OFFSET: usize = 24;
const BITS_PER_SAMPLE_OFFSET: usize = 34;
const DATA_LEN_OFFSET: usize = 40;

/// Decoded PCM audio, owned by a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Payload length in bytes as recorded in the header.
    pub data_len: u32,
    /// Interleaved samples (`L0, R0, L1, R1, ...` for stereo).
    pub samples: Vec<i16>,
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Interpret engine output as a [`PcmBuffer`].
///
/// Fails with [`NarrationError::UnsupportedFormat`] unless samples are 16-bit
/// and with [`NarrationError::UnsupportedChannelLayout`] unless the audio is
/// mono or stereo.
pub fn frame(raw: &[u8]) -> Result<PcmBuffer, NarrationError> {
    if raw.len() < HEADER_LEN {
        return Err(NarrationError::MalformedPcm(format!(
            "header truncated (need {HEADER_LEN} bytes, got {})",
            raw.len()
        )));
    }

    let channels = read_u16(raw, CHANNELS_OFFSET);
    let sample_rate = read_u32(raw, SAMPLE_RATE_OFFSET);
    let bits_per_sample = read_u16(raw, BITS_PER_SAMPLE_OFFSET);
    let data_len = read_u32(raw, DATA_LEN_OFFSET);

    if bits_per_sample != 16 {
        return Err(NarrationError::UnsupportedFormat { bits_per_sample });
    }
    if channels != 1 && channels != 2 {
        return Err(NarrationError::UnsupportedChannelLayout { channels });
    }
    if sample_rate == 0 {
        return Err(NarrationError::MalformedPcm("sample rate is zero".to_string()));
    }

    let payload = &raw[HEADER_LEN..];
    if payload.len() != data_len as usize {
        log::warn!(
            "PCM header declares {data_len} data bytes but {} follow the header",
            payload.len()
        );
    }
    let available = payload.len().min(data_len as usize);

    let samples = payload[..available]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    Ok(PcmBuffer {
        channels,
        sample_rate,
        bits_per_sample,
        data_len,
        samples,
    })
}

/// Playback length in seconds, derived from the header's payload length.
pub fn duration(pcm: &PcmBuffer) -> f64 {
    let bytes_per_second =
        pcm.sample_rate as f64 * pcm.channels as f64 * (pcm.bits_per_sample as f64 / 8.0);
    pcm.data_len as f64 / bytes_per_second
}

impl PcmBuffer {
    /// Write the samples to a 16-bit WAV file, mostly useful for debugging
    /// what the engine produced before encoding.
    pub fn write_wav(&self, path: &Path) -> Result<(), NarrationError> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).map_err(hound_error)?;
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(hound_error)?;
        }
        writer.finalize().map_err(hound_error)?;
        Ok(())
    }

    /// Number of samples per channel.
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }
}

fn hound_error(e: hound::Error) -> NarrationError {
    match e {
        hound::Error::IoError(io) => NarrationError::Io(io),
        other => NarrationError::Io(std::io::Error::other(other)),
    }
}
