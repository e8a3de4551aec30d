//! Configurable stub engine for testing the pipeline.

use crate::worker::EngineFactory;
use crate::{EngineOutput, TranscriptionEngine};
use std::path::Path;
use std::time::Duration;
use voxscribe_bus::Segment;
use voxscribe_foundation::SttError;

#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Text returned for every transcription.
    pub text: String,
    pub language: String,
    /// Simulated engine latency per call.
    pub transcribe_delay: Duration,
    /// Fail every call after this many successes.
    pub fail_after: Option<usize>,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            text: "stub transcription".to_string(),
            language: "en".to_string(),
            transcribe_delay: Duration::ZERO,
            fail_after: None,
        }
    }
}

/// Deterministic engine returning a fixed text with one segment per call.
#[derive(Debug)]
pub struct StubEngine {
    config: StubConfig,
    calls: usize,
}

impl StubEngine {
    pub fn new(config: StubConfig) -> Self {
        Self { config, calls: 0 }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(StubConfig {
            text: text.into(),
            ..Default::default()
        })
    }

    /// Factory suitable for `TranscriberWorker::spawn`.
    pub fn factory(config: StubConfig) -> EngineFactory {
        Box::new(move |_engine_config| {
            Ok(Box::new(StubEngine::new(config)) as Box<dyn TranscriptionEngine>)
        })
    }
}

impl TranscriptionEngine for StubEngine {
    fn transcribe(&mut self, audio_path: &Path) -> Result<EngineOutput, SttError> {
        if !self.config.transcribe_delay.is_zero() {
            std::thread::sleep(self.config.transcribe_delay);
        }

        self.calls += 1;
        if let Some(fail_after) = self.config.fail_after {
            if self.calls > fail_after {
                return Err(SttError::TranscriptionFailed {
                    path: audio_path.display().to_string(),
                    reason: "simulated failure".to_string(),
                });
            }
        }

        Ok(EngineOutput {
            text: self.config.text.clone(),
            segments: vec![Segment {
                id: 0,
                start: 0.0,
                end: 1.0,
                text: self.config.text.clone(),
            }],
            language: self.config.language.clone(),
            language_probability: 0.99,
        })
    }
}
