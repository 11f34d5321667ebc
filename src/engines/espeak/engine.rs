use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use async_trait::async_trait;

use super::wav;
use crate::config::EspeakConfig;
use crate::error::NarrationError;
use crate::params::SynthesisOptions;
use crate::SpeechSynthesizer;

/// espeak-ng backed [`SpeechSynthesizer`].
///
/// Every call spawns one `espeak-ng` process per text part on the blocking
/// thread pool. Multi-part requests run their parts one after another and
/// join the audio in order.
#[derive(Debug, Clone, Default)]
pub struct EspeakSynthesizer {
    config: EspeakConfig,
}

impl EspeakSynthesizer {
    pub fn new(config: EspeakConfig) -> Self {
        Self { config }
    }

    /// Check that espeak-ng can be run and return it as a shared engine.
    ///
    /// Meant as the initializer passed to
    /// [`EngineRegistry::initialize`](crate::EngineRegistry::initialize).
    pub async fn probe(config: EspeakConfig) -> Result<Arc<dyn SpeechSynthesizer>, NarrationError> {
        let engine = Self::new(config);
        let cfg = engine.config.clone();
        let version = tokio::task::spawn_blocking(move || espeak_version(&cfg))
            .await
            .map_err(join_error)??;
        log::info!("Using {}", version.trim());
        Ok(Arc::new(engine))
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn speak(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Option<Vec<u8>>, NarrationError> {
        let config = self.config.clone();
        let text = text.to_string();
        let options = options.clone();

        tokio::task::spawn_blocking(move || {
            let recording = run_espeak(&config, &text, &options)?;
            Ok::<_, NarrationError>(wav::join(vec![recording]))
        })
        .await
        .map_err(join_error)?
    }

    async fn speak_multipart(
        &self,
        parts: &[String],
        options: &SynthesisOptions,
    ) -> Result<Option<Vec<u8>>, NarrationError> {
        let config = self.config.clone();
        let parts = parts.to_vec();
        let options = options.clone();

        tokio::task::spawn_blocking(move || {
            let mut recordings = Vec::with_capacity(parts.len());
            for (i, part) in parts.iter().enumerate() {
                log::debug!("Synthesizing part {}/{}", i + 1, parts.len());
                recordings.push(run_espeak(&config, part, &options)?);
            }
            Ok::<_, NarrationError>(wav::join(recordings))
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> NarrationError {
    NarrationError::Engine(format!("espeak-ng task failed: {e}"))
}

fn command(config: &EspeakConfig) -> Command {
    let bin = config
        .bin_path
        .as_deref()
        .unwrap_or_else(|| Path::new("espeak-ng"));
    let mut cmd = Command::new(bin);
    if let Some(data) = &config.data_path {
        cmd.env("ESPEAK_DATA_PATH", data);
    }
    cmd
}

fn spawn_error(e: std::io::Error) -> NarrationError {
    if e.kind() == std::io::ErrorKind::NotFound {
        NarrationError::EspeakNotFound
    } else {
        NarrationError::Io(e)
    }
}

fn espeak_version(config: &EspeakConfig) -> Result<String, NarrationError> {
    let output = command(config)
        .arg("--version")
        .output()
        .map_err(spawn_error)?;
    if !output.status.success() {
        return Err(NarrationError::Engine(format!(
            "espeak-ng --version exited with code {:?}",
            output.status.code()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn espeak_args(options: &SynthesisOptions) -> Vec<String> {
    vec![
        "--stdout".to_string(),
        "--stdin".to_string(),
        "-v".to_string(),
        options.engine_voice(),
        "-s".to_string(),
        options.speed.to_string(),
        "-p".to_string(),
        options.pitch.to_string(),
        "-a".to_string(),
        options.amplitude.to_string(),
    ]
}

/// Synthesize `text` and return the WAV stream exactly as espeak-ng wrote it.
fn run_espeak(
    config: &EspeakConfig,
    text: &str,
    options: &SynthesisOptions,
) -> Result<Vec<u8>, NarrationError> {
    let mut child = command(config)
        .args(espeak_args(options))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    // Feed stdin from its own thread: espeak-ng starts writing audio before it
    // has read all input, and a full stdout pipe would otherwise stall both sides.
    let writer = child.stdin.take().map(|mut stdin| {
        let payload = canonicalize_stdin_payload(text).into_owned();
        std::thread::spawn(move || stdin.write_all(payload.as_bytes()))
    });

    let output = child.wait_with_output();
    // Always reap the writer; a dead child makes its write fail fast.
    let written = writer.map(|writer| writer.join());
    let output = output?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(Ok(Err(e))) = &written {
            log::debug!("espeak-ng stdin write failed: {e}");
        }
        return Err(NarrationError::Engine(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }

    if let Some(written) = written {
        written.map_err(|_| NarrationError::Engine("stdin writer panicked".to_string()))??;
    }

    Ok(output.stdout)
}

/// espeak-ng reads stdin line by line and can under-process a final line
/// without a terminator.
fn canonicalize_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}
