/// Every way a narration request can fail.
///
/// All variants are terminal for the request that produced them; nothing in
/// the pipeline retries. The `Display` text is meant to be shown to the user
/// as-is.
#[derive(thiserror::Error, Debug)]
pub enum NarrationError {
    #[error("Speech engine is not ready. Initialize it before requesting narration.")]
    EngineUnavailable,
    #[error("Speech engine produced no audio for this text.")]
    EmptyOutput,
    #[error("Unsupported PCM format: {bits_per_sample}-bit samples (only 16-bit is supported)")]
    UnsupportedFormat { bits_per_sample: u16 },
    #[error("Unsupported channel layout: {channels} channels (only mono or stereo is supported)")]
    UnsupportedChannelLayout { channels: u16 },
    #[error("Text is too long: {len} characters (limit is {max})")]
    InputTooLarge { len: usize, max: usize },
    #[error("Malformed PCM data: {0}")]
    MalformedPcm(String),
    #[error("Voice '{0}' not found. Call PresetCatalog::voices() to see available voices.")]
    UnknownVoice(String),
    #[error("Emotion '{0}' not found. Call PresetCatalog::emotions() to see available emotions.")]
    UnknownEmotion(String),
    #[error("Invalid narration request: {0}")]
    InvalidRequest(String),
    #[error("Speech engine failed: {0}")]
    Engine(String),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("MP3 encoder failed: {0}")]
    Encoder(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
