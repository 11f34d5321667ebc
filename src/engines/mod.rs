//! Concrete synthesis and encoding capabilities.
//!
//! # Available Engines
//!
//! - `espeak` - speech synthesis through the `espeak-ng` binary (always available)
//! - `lame` - MP3 encoding through LAME (enable the `lame` Cargo feature)

pub mod espeak;

#[cfg(feature = "lame")]
pub mod lame;
