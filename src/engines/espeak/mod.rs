//! espeak-ng speech synthesis.
//!
//! Drives the `espeak-ng` command-line synthesizer, which writes 16-bit mono
//! WAV to stdout at 22050 Hz.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Voices and Variants
//!
//! Voices are espeak-ng language voices (`en`, `en-us`, `en-gb`, ...).
//! Variants (`m1`-`m7`, `f1`-`f5`, ...) are appended as `voice+variant`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use narrate_rs::config::EspeakConfig;
//! use narrate_rs::engines::espeak::EspeakSynthesizer;
//! use narrate_rs::EngineRegistry;
//!
//! # async fn run() -> Result<(), narrate_rs::NarrationError> {
//! let registry = EngineRegistry::global();
//! registry
//!     .initialize(|| EspeakSynthesizer::probe(EspeakConfig::default()))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod wav;

pub use engine::EspeakSynthesizer;
