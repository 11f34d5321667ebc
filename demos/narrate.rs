use std::path::{Path, PathBuf};
use std::time::Instant;

use narrate_rs::engines::{espeak::EspeakSynthesizer, lame::LameEncoderFactory};
use narrate_rs::{EngineRegistry, NarrationRequestBuilder, Narrator, NarratorConfig, UserControls};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional: path to a JSON config as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => NarratorConfig::load(&PathBuf::from(path))?,
        None => NarratorConfig::default(),
    };

    let registry = EngineRegistry::global();
    let espeak = config.espeak.clone();
    registry
        .initialize(|| EspeakSynthesizer::probe(espeak))
        .await?;

    let narrator = Narrator::new(config, registry, LameEncoderFactory)?;
    println!(
        "Available voices: {:?}",
        narrator
            .catalog()
            .voices()
            .iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>()
    );

    let text = "Hello! This is a narration produced from plain text. \
                Long passages are split on sentence boundaries, spoken in order, \
                and encoded into a single MP3 file.";

    let request = NarrationRequestBuilder::default()
        .text(text)
        .voice("narrator")
        .emotion("calm")
        .controls(UserControls::new(1.1, 0))
        .build()?;

    let start = Instant::now();
    let artifact = narrator.narrate(&request).await?;
    println!(
        "Narrated {:.2}s of audio in {:.2?} ({} bytes)",
        artifact.duration_secs,
        start.elapsed(),
        artifact.bytes.len()
    );

    let path = artifact.write_to_dir(Path::new("."))?;
    println!("Saved to {}", path.display());

    registry.teardown();
    Ok(())
}
