//! # narrate-rs
//!
//! A Rust library that turns arbitrarily long text into a downloadable MP3
//! narration.
//!
//! ## Features
//!
//! - **Voice and emotion presets**: merged with the user's speed and pitch sliders
//!   into one engine-safe parameter set
//! - **Long text**: split on sentence boundaries into synthesizer-safe chunks
//! - **MP3 output**: engine PCM is transcoded block by block, mono or stereo
//! - **Pluggable capabilities**: the synthesizer and the MP3 encoder are traits,
//!   with `espeak-ng` and LAME implementations under [`engines`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! narrate-rs = { version = "2026.10", features = ["lame"] }
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use narrate_rs::engines::{espeak::EspeakSynthesizer, lame::LameEncoderFactory};
//! use narrate_rs::{EngineRegistry, NarrationRequestBuilder, Narrator, NarratorConfig};
//!
//! let config = NarratorConfig::default();
//! let registry = EngineRegistry::global();
//! registry
//!     .initialize(|| EspeakSynthesizer::probe(config.espeak.clone()))
//!     .await?;
//!
//! let narrator = Narrator::new(config, registry, LameEncoderFactory)?;
//! let request = NarrationRequestBuilder::default()
//!     .text("Hello, world!")
//!     .voice("narrator")
//!     .build()?;
//! let artifact = narrator.narrate(&request).await?;
//! artifact.write_to_dir(std::path::Path::new("."))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chunker;
pub mod config;
pub mod engines;
pub mod error;
pub mod mp3;
pub mod params;
pub mod pcm;
pub mod pipeline;
pub mod presets;
pub mod synth;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use config::NarratorConfig;
pub use error::NarrationError;
pub use params::{SynthesisOptions, UserControls};
pub use pipeline::{NarrationRequest, NarrationRequestBuilder, Narrator};
pub use presets::{EmotionPreset, PresetCatalog, VoiceCategory, VoicePreset};
pub use synth::EngineRegistry;

/// MIME type of every artifact.
pub const MP3_MIME_TYPE: &str = "audio/mpeg";

/// The finished narration handed back to the caller.
#[derive(Debug, Clone)]
pub struct SynthesisArtifact {
    /// Encoded MP3 stream
    pub bytes: Vec<u8>,
    /// Playback length in seconds
    pub duration_secs: f64,
    /// Suggested file name, e.g. `narration-20261016-142501.mp3`
    pub filename: String,
    pub mime_type: &'static str,
}

impl SynthesisArtifact {
    /// Build an artifact named after the current local time.
    pub fn new(bytes: Vec<u8>, duration_secs: f64) -> Self {
        let filename = chrono::Local::now()
            .format("narration-%Y%m%d-%H%M%S.mp3")
            .to_string();
        Self {
            bytes,
            duration_secs,
            filename,
            mime_type: MP3_MIME_TYPE,
        }
    }

    /// Write the MP3 into `dir` under its suggested file name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, NarrationError> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Common interface for speech synthesis engines.
///
/// Both calls return the engine's raw output: a canonical 44-byte WAV header
/// followed by 16-bit PCM (see [`pcm::frame`]). `None` means the engine
/// produced nothing.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one piece of text.
    async fn speak(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Option<Vec<u8>>, NarrationError>;

    /// Synthesize several pieces as one recording, in the given order.
    async fn speak_multipart(
        &self,
        parts: &[String],
        options: &SynthesisOptions,
    ) -> Result<Option<Vec<u8>>, NarrationError>;
}
