//! End-to-end narration: text in, MP3 artifact out.

use derive_builder::Builder;

use crate::config::NarratorConfig;
use crate::error::NarrationError;
use crate::mp3::{self, Mp3EncoderFactory};
use crate::params::{self, UserControls};
use crate::pcm;
use crate::presets::{PresetCatalog, DEFAULT_EMOTION_ID, DEFAULT_VOICE_ID};
use crate::synth::{self, EngineRegistry};
use crate::{chunker, SynthesisArtifact};

/// One narration request, as collected from the user.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct NarrationRequest {
    pub text: String,
    /// Voice preset id.
    #[builder(default = "DEFAULT_VOICE_ID.to_string()")]
    pub voice: String,
    /// Emotion preset id.
    #[builder(default = "DEFAULT_EMOTION_ID.to_string()")]
    pub emotion: String,
    #[builder(default)]
    pub controls: UserControls,
}

impl From<NarrationRequestBuilderError> for NarrationError {
    fn from(e: NarrationRequestBuilderError) -> Self {
        NarrationError::InvalidRequest(e.to_string())
    }
}

/// Runs requests through chunking, synthesis, framing, encoding and timing.
///
/// The engine comes from `registry` and must be initialized before the first
/// request. Each request opens its own encoder from `encoders`.
pub struct Narrator<'a, F> {
    config: NarratorConfig,
    catalog: PresetCatalog,
    registry: &'a EngineRegistry,
    encoders: F,
}

impl<'a, F: Mp3EncoderFactory> Narrator<'a, F> {
    pub fn new(
        config: NarratorConfig,
        registry: &'a EngineRegistry,
        encoders: F,
    ) -> Result<Self, NarrationError> {
        let catalog = config.catalog()?;
        Ok(Self {
            config,
            catalog,
            registry,
            encoders,
        })
    }

    /// Presets available to requests.
    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    /// Produce the MP3 narration for `request`.
    ///
    /// Either every stage succeeds and an artifact is returned, or the first
    /// failure is returned and nothing is produced.
    pub async fn narrate(
        &self,
        request: &NarrationRequest,
    ) -> Result<SynthesisArtifact, NarrationError> {
        let len = request.text.chars().count();
        if len > self.config.max_input_chars {
            return Err(NarrationError::InputTooLarge {
                len,
                max: self.config.max_input_chars,
            });
        }
        if request.text.trim().is_empty() {
            return Err(NarrationError::InvalidRequest("text is empty".to_string()));
        }

        let voice = self.catalog.voice(&request.voice)?;
        let emotion = self.catalog.emotion(&request.emotion)?;
        let options = params::resolve(voice, emotion, request.controls);
        let chunks = chunker::split(&request.text);

        let engine = self.registry.ready()?;
        let raw = synth::invoke(engine.as_ref(), &chunks, &options).await?;

        let pcm = pcm::frame(&raw)?;
        if pcm.frames() == 0 {
            return Err(NarrationError::EmptyOutput);
        }
        let bytes = mp3::transcode(&pcm, self.config.bitrate_kbps, &self.encoders)?;
        let duration = pcm::duration(&pcm);

        let artifact = SynthesisArtifact::new(bytes, duration);
        log::info!(
            "Narrated {len} characters in {} chunk(s): {:.2}s of audio, {} MP3 bytes",
            chunks.len(),
            artifact.duration_secs,
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}
