use serde::{Deserialize, Serialize};

use crate::presets::{EmotionPreset, VoicePreset};

/// Engine speed (words per minute) at a user speed of 1.0.
pub const NOMINAL_SPEED: f64 = 175.0;
/// Engine pitch at a user pitch of 0.
pub const NOMINAL_PITCH: f64 = 50.0;
/// Engine amplitude, in percent of nominal loudness.
pub const NOMINAL_AMPLITUDE: i64 = 100;

pub const SPEED_RANGE: (u32, u32) = (80, 360);
pub const PITCH_RANGE: (u32, u32) = (1, 99);
pub const AMPLITUDE_RANGE: (u32, u32) = (10, 200);

/// Range of the user speed slider.
pub const USER_SPEED_RANGE: (f64, f64) = (0.5, 2.0);
/// Range of the user pitch slider.
pub const USER_PITCH_RANGE: (i32, i32) = (-10, 10);

/// The two sliders a user controls, read once per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserControls {
    /// Speed multiplier. Range: 0.5–2.0, default 1.0.
    pub speed: f64,
    /// Pitch offset. Range: -10–10, default 0.
    pub pitch: i32,
}

impl Default for UserControls {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 0,
        }
    }
}

impl UserControls {
    pub fn new(speed: f64, pitch: i32) -> Self {
        Self { speed, pitch }
    }
}

/// The exact option set handed to a synthesis engine.
///
/// Values are in engine units and always within [`SPEED_RANGE`],
/// [`PITCH_RANGE`] and [`AMPLITUDE_RANGE`] when produced by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SynthesisOptions {
    pub voice_id: String,
    pub variant: Option<String>,
    pub speed: u32,
    pub pitch: u32,
    pub amplitude: u32,
}

impl SynthesisOptions {
    /// Voice name in `voice+variant` form, as espeak-style engines expect it.
    pub fn engine_voice(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}+{}", self.voice_id, variant),
            None => self.voice_id.clone(),
        }
    }
}

fn clamp_to(value: i64, (lo, hi): (u32, u32)) -> u32 {
    value.clamp(lo as i64, hi as i64) as u32
}

/// Merge a voice, an emotion and the user's sliders into one option set.
///
/// Each value is the full additive sum clamped once to the engine range.
/// Intermediate sums are never clamped.
pub fn resolve(
    voice: &VoicePreset,
    emotion: &EmotionPreset,
    controls: UserControls,
) -> SynthesisOptions {
    // `as i64` saturates, and NaN becomes 0, so hostile floats still land in range.
    let speed = (NOMINAL_SPEED * controls.speed
        + voice.speed_offset as f64
        + emotion.speed_delta as f64)
        .round() as i64;

    let pitch = (NOMINAL_PITCH
        + controls.pitch as f64 * 2.0
        + voice.pitch_offset as f64
        + emotion.pitch_delta as f64)
        .round() as i64;

    let amplitude = NOMINAL_AMPLITUDE + emotion.amplitude_delta as i64;

    SynthesisOptions {
        voice_id: voice.engine_voice.clone(),
        variant: voice.variant.clone(),
        speed: clamp_to(speed, SPEED_RANGE),
        pitch: clamp_to(pitch, PITCH_RANGE),
        amplitude: clamp_to(amplitude, AMPLITUDE_RANGE),
    }
}
