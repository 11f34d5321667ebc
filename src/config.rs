use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::NarrationError;
use crate::mp3::DEFAULT_BITRATE_KBPS;
use crate::presets::{EmotionPreset, PresetCatalog, VoicePreset};

/// Longest text accepted into the pipeline, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 100_000;

/// Location of the espeak-ng binary and its voice data.
///
/// Either path can be `None` to use the system default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EspeakConfig {
    pub bin_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

/// Settings for a [`Narrator`](crate::Narrator).
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// MP3 bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Requests with more characters than this are rejected.
    pub max_input_chars: usize,
    pub espeak: EspeakConfig,
    /// Extra voices on top of the built-in catalog.
    pub voices: Vec<VoicePreset>,
    /// Extra emotions on top of the built-in catalog.
    pub emotions: Vec<EmotionPreset>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            espeak: EspeakConfig::default(),
            voices: Vec::new(),
            emotions: Vec::new(),
        }
    }
}

impl NarratorConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, NarrationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NarrationError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, NarrationError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| NarrationError::Config(format!("Failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), NarrationError> {
        if self.bitrate_kbps == 0 {
            return Err(NarrationError::Config("bitrate_kbps must be > 0".to_string()));
        }
        if self.max_input_chars == 0 {
            return Err(NarrationError::Config(
                "max_input_chars must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The built-in presets extended with the ones from this config.
    pub fn catalog(&self) -> Result<PresetCatalog, NarrationError> {
        let mut catalog = PresetCatalog::builtin();
        catalog.extend(self.voices.clone(), self.emotions.clone())?;
        Ok(catalog)
    }
}
