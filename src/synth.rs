//! Driving the synthesis engine: the per-request invoker and the
//! process-wide engine lifecycle.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::error::NarrationError;
use crate::params::SynthesisOptions;
use crate::pcm::HEADER_LEN;
use crate::SpeechSynthesizer;

/// Synthesize `chunks` in order and return the engine's raw PCM container.
///
/// One chunk goes through [`SpeechSynthesizer::speak`], several through a
/// single [`SpeechSynthesizer::speak_multipart`] call. Output without any
/// sample data is [`NarrationError::EmptyOutput`]. Nothing is retried.
pub async fn invoke(
    engine: &dyn SpeechSynthesizer,
    chunks: &[String],
    options: &SynthesisOptions,
) -> Result<Vec<u8>, NarrationError> {
    log::debug!(
        "Synthesizing {} part(s) with voice={} speed={} pitch={} amplitude={}",
        chunks.len(),
        options.engine_voice(),
        options.speed,
        options.pitch,
        options.amplitude
    );

    let output = match chunks {
        [] => None,
        [single] => engine.speak(single, options).await?,
        parts => engine.speak_multipart(parts, options).await?,
    };

    match output {
        Some(raw) if raw.len() > HEADER_LEN => Ok(raw),
        _ => Err(NarrationError::EmptyOutput),
    }
}

type EngineCell = OnceCell<Arc<dyn SpeechSynthesizer>>;

/// Owner of the one shared synthesis engine.
///
/// Lifecycle: [`initialize`](Self::initialize) runs the initializer exactly
/// once, no matter how many callers race on first access; all of them await
/// the same cell and receive the same engine. [`ready`](Self::ready) hands out
/// the engine afterwards. [`teardown`](Self::teardown) drops the registry's
/// reference so the next `initialize` starts over; requests that already
/// hold the engine keep it until they finish.
pub struct EngineRegistry {
    cell: RwLock<Arc<EngineCell>>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static EngineRegistry {
        static REGISTRY: OnceLock<EngineRegistry> = OnceLock::new();
        REGISTRY.get_or_init(EngineRegistry::new)
    }

    /// Initialize the engine, or wait for the initialization already under way.
    ///
    /// If `init` fails, the error goes to the caller that ran it and the cell
    /// stays empty, so a later call may try again.
    pub async fn initialize<F, Fut>(
        &self,
        init: F,
    ) -> Result<Arc<dyn SpeechSynthesizer>, NarrationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn SpeechSynthesizer>, NarrationError>>,
    {
        let cell = Arc::clone(&*self.cell.read());
        let engine = cell
            .get_or_try_init(|| async move {
                log::info!("Initializing speech engine");
                let engine = init().await?;
                log::info!("Speech engine ready");
                Ok::<_, NarrationError>(engine)
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// The engine, if initialization has completed.
    pub fn ready(&self) -> Result<Arc<dyn SpeechSynthesizer>, NarrationError> {
        self.cell
            .read()
            .get()
            .cloned()
            .ok_or(NarrationError::EngineUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.cell.read().initialized()
    }

    /// Release the engine. Returns whether one was initialized.
    pub fn teardown(&self) -> bool {
        let old = std::mem::replace(&mut *self.cell.write(), Arc::new(OnceCell::new()));
        let was_ready = old.initialized();
        if was_ready {
            log::info!("Speech engine released");
        }
        was_ready
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pcm::tests::{pcm16_payload, wav_bytes};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Single(String),
        Multi(Vec<String>),
    }

    /// Returns one mono sample per input character at 22050 Hz.
    #[derive(Default)]
    pub(crate) struct ScriptedSynth {
        pub calls: Mutex<Vec<(Call, SynthesisOptions)>>,
        pub silent: bool,
    }

    impl ScriptedSynth {
        pub(crate) fn silent() -> Self {
            Self {
                silent: true,
                ..Default::default()
            }
        }

        fn render(&self, text_len: usize) -> Option<Vec<u8>> {
            if self.silent {
                return None;
            }
            let samples: Vec<i16> = (0..text_len).map(|i| (i % 100) as i16).collect();
            Some(wav_bytes(1, 22050, 16, &pcm16_payload(&samples)))
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for ScriptedSynth {
        async fn speak(
            &self,
            text: &str,
            options: &SynthesisOptions,
        ) -> Result<Option<Vec<u8>>, NarrationError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Single(text.to_string()), options.clone()));
            Ok(self.render(text.chars().count()))
        }

        async fn speak_multipart(
            &self,
            parts: &[String],
            options: &SynthesisOptions,
        ) -> Result<Option<Vec<u8>>, NarrationError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Multi(parts.to_vec()), options.clone()));
            Ok(self.render(parts.iter().map(|p| p.chars().count()).sum()))
        }
    }

    fn options() -> SynthesisOptions {
        SynthesisOptions {
            voice_id: "en".to_string(),
            variant: None,
            speed: 175,
            pitch: 50,
            amplitude: 100,
        }
    }

    #[tokio::test]
    async fn single_chunk_uses_single_part_call() {
        let synth = ScriptedSynth::default();
        let raw = invoke(&synth, &["Hello.".to_string()], &options())
            .await
            .unwrap();
        assert_eq!(raw.len(), HEADER_LEN + 12);
        let calls = synth.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Call::Single("Hello.".to_string()));
    }

    #[tokio::test]
    async fn several_chunks_go_out_in_one_ordered_call() {
        let synth = ScriptedSynth::default();
        let chunks = vec!["One.".to_string(), "Two.".to_string(), "Three.".to_string()];
        invoke(&synth, &chunks, &options()).await.unwrap();
        let calls = synth.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Call::Multi(chunks.clone()));
        assert_eq!(calls[0].1, options());
    }

    #[tokio::test]
    async fn null_result_is_empty_output() {
        let synth = ScriptedSynth::silent();
        let err = invoke(&synth, &["Hi.".to_string()], &options())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrationError::EmptyOutput));
        assert_eq!(synth.calls.lock().unwrap().len(), 1, "must not retry");
    }

    #[tokio::test]
    async fn header_without_samples_is_empty_output() {
        struct HeaderOnly;
        #[async_trait]
        impl SpeechSynthesizer for HeaderOnly {
            async fn speak(
                &self,
                _: &str,
                _: &SynthesisOptions,
            ) -> Result<Option<Vec<u8>>, NarrationError> {
                Ok(Some(wav_bytes(1, 22050, 16, &[])))
            }
            async fn speak_multipart(
                &self,
                _: &[String],
                _: &SynthesisOptions,
            ) -> Result<Option<Vec<u8>>, NarrationError> {
                Ok(None)
            }
        }
        let err = invoke(&HeaderOnly, &["Hi.".to_string()], &options())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrationError::EmptyOutput));
    }

    #[test]
    fn registry_starts_unavailable() {
        let registry = EngineRegistry::new();
        assert!(!registry.is_ready());
        assert!(matches!(
            registry.ready(),
            Err(NarrationError::EngineUnavailable)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_initialization_runs_once() {
        let registry = Arc::new(EngineRegistry::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                registry
                    .initialize(|| async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(Arc::new(ScriptedSynth::default()) as Arc<dyn SpeechSynthesizer>)
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut engines = Vec::new();
        for handle in handles {
            engines.push(handle.await.unwrap());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(engines.iter().all(|e| Arc::ptr_eq(e, &engines[0])));
        assert!(Arc::ptr_eq(&registry.ready().unwrap(), &engines[0]));
    }

    #[tokio::test]
    async fn failed_initialization_can_be_retried() {
        let registry = EngineRegistry::new();
        let err = registry
            .initialize(|| async {
                Err::<Arc<dyn SpeechSynthesizer>, _>(NarrationError::EspeakNotFound)
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, NarrationError::EspeakNotFound));
        assert!(!registry.is_ready());

        registry
            .initialize(|| async {
                Ok(Arc::new(ScriptedSynth::default()) as Arc<dyn SpeechSynthesizer>)
            })
            .await
            .unwrap();
        assert!(registry.is_ready());
    }

    #[tokio::test]
    async fn teardown_allows_reinitialization() {
        let registry = EngineRegistry::new();
        let first = registry
            .initialize(|| async {
                Ok(Arc::new(ScriptedSynth::default()) as Arc<dyn SpeechSynthesizer>)
            })
            .await
            .unwrap();

        assert!(registry.teardown());
        assert!(!registry.teardown());
        assert!(registry.ready().is_err());

        // A request holding the old engine can still use it.
        invoke(first.as_ref(), &["Still here.".to_string()], &options())
            .await
            .unwrap();

        let second = registry
            .initialize(|| async {
                Ok(Arc::new(ScriptedSynth::default()) as Arc<dyn SpeechSynthesizer>)
            })
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
