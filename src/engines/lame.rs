//! LAME MP3 encoding.
//!
//! Enabled by the `lame` Cargo feature. The LAME sources are built and
//! linked statically by `mp3lame-encoder`, so no system library is needed.

use mp3lame_encoder::{
    max_required_buffer_size, Bitrate, Builder, DualPcm, Encoder, FlushNoGap, MonoPcm, Quality,
};

use crate::error::NarrationError;
use crate::mp3::{EncoderSettings, Mp3BlockEncoder, Mp3EncoderFactory};

/// Opens a new LAME encoder per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LameEncoderFactory;

/// LAME's fixed bitrate table, in kbps.
fn bitrate(kbps: u32) -> Result<Bitrate, NarrationError> {
    Ok(match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => {
            return Err(NarrationError::Encoder(format!(
                "unsupported bitrate {other} kbps"
            )))
        }
    })
}

fn lame_error(context: &str, e: impl std::fmt::Debug) -> NarrationError {
    NarrationError::Encoder(format!("{context}: {e:?}"))
}

impl Mp3EncoderFactory for LameEncoderFactory {
    fn open(
        &self,
        settings: EncoderSettings,
    ) -> Result<Box<dyn Mp3BlockEncoder + Send>, NarrationError> {
        let mut builder = Builder::new()
            .ok_or_else(|| NarrationError::Encoder("failed to allocate LAME".to_string()))?;
        builder
            .set_num_channels(settings.channels as u8)
            .map_err(|e| lame_error("channels", e))?;
        builder
            .set_sample_rate(settings.sample_rate)
            .map_err(|e| lame_error("sample rate", e))?;
        builder
            .set_brate(bitrate(settings.bitrate_kbps)?)
            .map_err(|e| lame_error("bitrate", e))?;
        builder
            .set_quality(Quality::Good)
            .map_err(|e| lame_error("quality", e))?;
        let encoder = builder.build().map_err(|e| lame_error("init", e))?;

        log::debug!(
            "Opened LAME encoder: {} channel(s), {} Hz, {} kbps",
            settings.channels,
            settings.sample_rate,
            settings.bitrate_kbps
        );
        Ok(Box::new(LameBlockEncoder { encoder }))
    }
}

struct LameBlockEncoder {
    encoder: Encoder,
}

impl Mp3BlockEncoder for LameBlockEncoder {
    fn encode_block(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
    ) -> Result<Vec<u8>, NarrationError> {
        let mut out = Vec::with_capacity(max_required_buffer_size(left.len()));
        match right {
            None => self.encoder.encode_to_vec(MonoPcm(left), &mut out),
            Some(right) => self.encoder.encode_to_vec(DualPcm { left, right }, &mut out),
        }
        .map_err(|e| lame_error("encode", e))?;
        Ok(out)
    }

    fn flush(&mut self) -> Result<Vec<u8>, NarrationError> {
        // LAME's documented upper bound for the final flush.
        let mut out = Vec::with_capacity(7200);
        self.encoder
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(|e| lame_error("flush", e))?;
        Ok(out)
    }
}
