//! Transcription engine abstraction and the background worker that owns it.
//!
//! The engine is an external collaborator: an opaque, possibly slow,
//! possibly failing `(audio) -> (text, segments, language)` call. This
//! crate defines the trait boundary, the worker state machine, and the
//! dedicated thread that drains the job queue and returns results.

pub mod config;
pub mod engines;
pub mod state;
pub mod worker;

pub use config::EngineConfig;
pub use state::{WorkerState, WorkerStateCell};
pub use worker::{EngineFactory, TranscriberWorker, WorkerConfig, WorkerHandle};

use std::path::Path;
use voxscribe_bus::Segment;
use voxscribe_foundation::SttError;

/// What the engine produces for one piece of audio.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
    pub language_probability: f64,
}

/// Blocking transcription interface.
///
/// The instance is owned exclusively by the worker thread and never
/// accessed concurrently. Calls may take seconds and have no internal
/// cancellation hook; cancellation only prevents starting the next job.
pub trait TranscriptionEngine: Send {
    fn transcribe(&mut self, audio_path: &Path) -> Result<EngineOutput, SttError>;
}
