use serde::{Deserialize, Serialize};

use crate::error::NarrationError;

/// Id of the voice used when a request does not name one.
pub const DEFAULT_VOICE_ID: &str = "default";

/// Id of the emotion used when a request does not name one.
pub const DEFAULT_EMOTION_ID: &str = "neutral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCategory {
    Masculine,
    Feminine,
}

/// A selectable narrator voice.
///
/// `engine_voice` and `variant` are passed to the engine verbatim; the
/// offsets are added to the engine's nominal speed and pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePreset {
    pub id: String,
    pub engine_voice: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub category: VoiceCategory,
    pub style: String,
    #[serde(default)]
    pub speed_offset: i32,
    #[serde(default)]
    pub pitch_offset: i32,
}

/// An emotional coloring applied on top of a voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionPreset {
    pub id: String,
    #[serde(default)]
    pub pitch_delta: i32,
    #[serde(default)]
    pub speed_delta: i32,
    #[serde(default)]
    pub amplitude_delta: i32,
}

fn voice(
    id: &str,
    engine_voice: &str,
    variant: Option<&str>,
    category: VoiceCategory,
    style: &str,
    speed_offset: i32,
    pitch_offset: i32,
) -> VoicePreset {
    VoicePreset {
        id: id.to_string(),
        engine_voice: engine_voice.to_string(),
        variant: variant.map(str::to_string),
        category,
        style: style.to_string(),
        speed_offset,
        pitch_offset,
    }
}

fn emotion(id: &str, pitch_delta: i32, speed_delta: i32, amplitude_delta: i32) -> EmotionPreset {
    EmotionPreset {
        id: id.to_string(),
        pitch_delta,
        speed_delta,
        amplitude_delta,
    }
}

/// The immutable set of voices and emotions a narrator can choose from.
///
/// Built once at startup and only read afterwards. Lookups are linear; the
/// catalog holds a handful of entries.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    voices: Vec<VoicePreset>,
    emotions: Vec<EmotionPreset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    /// The catalog shipped with the library.
    pub fn builtin() -> Self {
        use VoiceCategory::{Feminine, Masculine};

        let voices = vec![
            voice(DEFAULT_VOICE_ID, "en-us", None, Masculine, "Plain", 0, 0),
            voice("narrator", "en-us", Some("m3"), Masculine, "Warm narrator", 0, -4),
            voice("deep", "en", Some("m7"), Masculine, "Deep and slow", -10, -12),
            voice("clara", "en-us", Some("f3"), Feminine, "Clear", 0, 6),
            voice("bright", "en", Some("f4"), Feminine, "Bright and quick", 10, 10),
            voice("briton", "en-gb", Some("m1"), Masculine, "British", 0, 0),
            voice("whisperer", "en", Some("f5"), Feminine, "Soft", -15, 2),
        ];

        let emotions = vec![
            emotion(DEFAULT_EMOTION_ID, 0, 0, 0),
            emotion("happy", 8, 20, 10),
            emotion("sad", -8, -25, -20),
            emotion("angry", 3, 30, 40),
            emotion("calm", -3, -15, -10),
            emotion("excited", 12, 35, 25),
        ];

        Self { voices, emotions }
    }

    /// Add custom presets on top of the current ones.
    ///
    /// Ids must be unique across the whole catalog.
    pub fn extend(
        &mut self,
        voices: Vec<VoicePreset>,
        emotions: Vec<EmotionPreset>,
    ) -> Result<(), NarrationError> {
        for v in voices {
            if self.voice(&v.id).is_ok() {
                return Err(NarrationError::Config(format!("duplicate voice id '{}'", v.id)));
            }
            self.voices.push(v);
        }
        for e in emotions {
            if self.emotion(&e.id).is_ok() {
                return Err(NarrationError::Config(format!(
                    "duplicate emotion id '{}'",
                    e.id
                )));
            }
            self.emotions.push(e);
        }
        Ok(())
    }

    pub fn voice(&self, id: &str) -> Result<&VoicePreset, NarrationError> {
        self.voices
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| NarrationError::UnknownVoice(id.to_string()))
    }

    pub fn emotion(&self, id: &str) -> Result<&EmotionPreset, NarrationError> {
        self.emotions
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| NarrationError::UnknownEmotion(id.to_string()))
    }

    /// All voices, in catalog order.
    pub fn voices(&self) -> &[VoicePreset] {
        &self.voices
    }

    /// All emotions, in catalog order.
    pub fn emotions(&self) -> &[EmotionPreset] {
        &self.emotions
    }

    /// Voices of one category, e.g. for a grouped picker.
    pub fn voices_in(&self, category: VoiceCategory) -> impl Iterator<Item = &VoicePreset> {
        self.voices.iter().filter(move |v| v.category == category)
    }
}
