//! Block-wise MP3 transcoding of framed PCM.

use crate::error::NarrationError;
use crate::pcm::PcmBuffer;

/// Samples per channel consumed by one encoder call. Fixed by the MP3 frame size.
pub const BLOCK_SAMPLES: usize = 1152;

/// Default MP3 bitrate in kbps.
pub const DEFAULT_BITRATE_KBPS: u32 = 128;

/// Settings an encoder is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub channels: u16,
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

/// A stateful block encoder.
///
/// One instance serves exactly one request; blocks must arrive in order.
pub trait Mp3BlockEncoder {
    /// Encode one block. `right` is `Some` for stereo and always the same
    /// length as `left`. May return no bytes while the encoder buffers.
    fn encode_block(&mut self, left: &[i16], right: Option<&[i16]>)
        -> Result<Vec<u8>, NarrationError>;

    /// Drain whatever the encoder still holds.
    fn flush(&mut self) -> Result<Vec<u8>, NarrationError>;
}

/// Opens a fresh encoder for each request.
pub trait Mp3EncoderFactory: Send + Sync {
    fn open(
        &self,
        settings: EncoderSettings,
    ) -> Result<Box<dyn Mp3BlockEncoder + Send>, NarrationError>;
}

/// Split interleaved stereo into left and right channels of equal length.
///
/// A trailing unpaired sample is dropped.
pub fn deinterleave(samples: &[i16]) -> (Vec<i16>, Vec<i16>) {
    samples
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .unzip()
}

/// Encode `pcm` to MP3 at `bitrate_kbps`.
///
/// Walks the samples in [`BLOCK_SAMPLES`] blocks, then flushes. Output chunks
/// are concatenated in call order.
pub fn transcode(
    pcm: &PcmBuffer,
    bitrate_kbps: u32,
    factory: &dyn Mp3EncoderFactory,
) -> Result<Vec<u8>, NarrationError> {
    if pcm.channels != 1 && pcm.channels != 2 {
        return Err(NarrationError::UnsupportedChannelLayout {
            channels: pcm.channels,
        });
    }

    let mut encoder = factory.open(EncoderSettings {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bitrate_kbps,
    })?;

    let mut mp3 = Vec::new();
    let mut blocks = 0usize;

    if pcm.channels == 1 {
        for block in pcm.samples.chunks(BLOCK_SAMPLES) {
            append(&mut mp3, encoder.encode_block(block, None)?);
            blocks += 1;
        }
    } else {
        let (left, right) = deinterleave(&pcm.samples);
        for (l, r) in left.chunks(BLOCK_SAMPLES).zip(right.chunks(BLOCK_SAMPLES)) {
            append(&mut mp3, encoder.encode_block(l, Some(r))?);
            blocks += 1;
        }
    }

    append(&mut mp3, encoder.flush()?);

    log::debug!(
        "Encoded {blocks} blocks ({} channel(s), {} Hz) into {} MP3 bytes",
        pcm.channels,
        pcm.sample_rate,
        mp3.len()
    );
    Ok(mp3)
}

fn append(dst: &mut Vec<u8>, chunk: Vec<u8>) {
    if !chunk.is_empty() {
        dst.extend_from_slice(&chunk);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    pub(crate) struct EncoderLog {
        pub settings: Vec<EncoderSettings>,
        pub blocks: Vec<(Vec<i16>, Option<Vec<i16>>)>,
        pub flushes: usize,
    }

    /// Emits one marker byte per block (none for every third block) and
    /// `[0xFF, 0xEE]` on flush.
    pub(crate) struct RecordingEncoder {
        log: Arc<Mutex<EncoderLog>>,
    }

    impl Mp3BlockEncoder for RecordingEncoder {
        fn encode_block(
            &mut self,
            left: &[i16],
            right: Option<&[i16]>,
        ) -> Result<Vec<u8>, NarrationError> {
            let mut log = self.log.lock().unwrap();
            log.blocks.push((left.to_vec(), right.map(<[i16]>::to_vec)));
            let n = log.blocks.len();
            Ok(if n % 3 == 0 { vec![] } else { vec![n as u8] })
        }

        fn flush(&mut self) -> Result<Vec<u8>, NarrationError> {
            self.log.lock().unwrap().flushes += 1;
            Ok(vec![0xFF, 0xEE])
        }
    }

    #[derive(Default, Clone)]
    pub(crate) struct RecordingFactory {
        pub log: Arc<Mutex<EncoderLog>>,
    }

    impl Mp3EncoderFactory for RecordingFactory {
        fn open(
            &self,
            settings: EncoderSettings,
        ) -> Result<Box<dyn Mp3BlockEncoder + Send>, NarrationError> {
            self.log.lock().unwrap().settings.push(settings);
            Ok(Box::new(RecordingEncoder {
                log: Arc::clone(&self.log),
            }))
        }
    }

    fn pcm(channels: u16, samples: Vec<i16>) -> PcmBuffer {
        PcmBuffer {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            data_len: samples.len() as u32 * 2,
            samples,
        }
    }

    #[test]
    fn stereo_is_fed_as_separate_channels() {
        let factory = RecordingFactory::default();
        transcode(&pcm(2, vec![10, -10, 20, -20]), 128, &factory).unwrap();

        let log = factory.log.lock().unwrap();
        assert_eq!(log.blocks, vec![(vec![10, 20], Some(vec![-10, -20]))]);
        assert_eq!(
            log.settings,
            vec![EncoderSettings {
                channels: 2,
                sample_rate: 22050,
                bitrate_kbps: 128
            }]
        );
    }

    #[test]
    fn mono_walks_fixed_blocks_then_flushes() {
        let factory = RecordingFactory::default();
        let samples: Vec<i16> = (0..(BLOCK_SAMPLES * 2 + 100) as i16).collect();
        let mp3 = transcode(&pcm(1, samples.clone()), 64, &factory).unwrap();

        let log = factory.log.lock().unwrap();
        let lens: Vec<usize> = log.blocks.iter().map(|(l, _)| l.len()).collect();
        assert_eq!(lens, vec![BLOCK_SAMPLES, BLOCK_SAMPLES, 100]);
        assert!(log.blocks.iter().all(|(_, r)| r.is_none()));
        assert_eq!(log.blocks[1].0[0], BLOCK_SAMPLES as i16);
        assert_eq!(log.flushes, 1);

        // Block 3 produced nothing; flush tail comes last.
        assert_eq!(mp3, vec![1, 2, 0xFF, 0xEE]);
    }

    #[test]
    fn stereo_blocks_stay_the_same_length() {
        let factory = RecordingFactory::default();
        let samples: Vec<i16> = (0..(BLOCK_SAMPLES * 2 + 6) as i16).collect();
        transcode(&pcm(2, samples), 128, &factory).unwrap();

        let log = factory.log.lock().unwrap();
        assert_eq!(log.blocks.len(), 2);
        for (l, r) in &log.blocks {
            assert_eq!(Some(l.len()), r.as_ref().map(Vec::len));
        }
        assert_eq!(log.blocks[1].0.len(), 3);
    }

    #[test]
    fn empty_pcm_still_flushes() {
        let factory = RecordingFactory::default();
        let mp3 = transcode(&pcm(1, vec![]), 128, &factory).unwrap();
        assert_eq!(mp3, vec![0xFF, 0xEE]);
        assert!(factory.log.lock().unwrap().blocks.is_empty());
    }

    #[test]
    fn invalid_layout_fails_before_opening_an_encoder() {
        let factory = RecordingFactory::default();
        let err = transcode(&pcm(6, vec![0; 12]), 128, &factory).unwrap_err();
        assert!(matches!(
            err,
            NarrationError::UnsupportedChannelLayout { channels: 6 }
        ));
        assert!(factory.log.lock().unwrap().settings.is_empty());
    }

    #[test]
    fn deinterleave_drops_unpaired_tail() {
        assert_eq!(deinterleave(&[1, 2, 3, 4, 5]), (vec![1, 3], vec![2, 4]));
    }
}
