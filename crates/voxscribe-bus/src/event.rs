//! Event and payload types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One unit of audio awaiting transcription.
///
/// Jobs carry no identity beyond the path; two jobs referencing the same
/// file are independent, and at-most-once processing is per enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJob {
    pub audio_path: PathBuf,
}

impl TranscriptionJob {
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
        }
    }
}

/// One timed span of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// The output of successfully transcribing one job.
///
/// Owned by the worker until pushed onto the result queue; ownership
/// transfers to the reconciler on dequeue.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub audio_path: PathBuf,
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
    pub language_probability: f64,
}

/// Payload of a `TranscriptionCompleted` event.
///
/// The worker publishes `Raw` as soon as the engine returns; the reconciler
/// republishes `Saved` once the record has a storage-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletedTranscription {
    Raw(TranscriptionResult),
    Saved {
        id: i64,
        text: String,
        segments: Vec<Segment>,
    },
}

impl CompletedTranscription {
    pub fn text(&self) -> &str {
        match self {
            CompletedTranscription::Raw(result) => &result.text,
            CompletedTranscription::Saved { text, .. } => text,
        }
    }
}

/// Application events. Publishing is fire-and-forget; multiple publishes of
/// the same kind from one thread are delivered in order, and no ordering is
/// guaranteed across kinds.
#[derive(Debug, Clone)]
pub enum AppEvent {
    RecordingStarted(PathBuf),
    RecordingStopped(PathBuf),
    TranscriptionRequested(PathBuf),
    TranscriptionCompleted(CompletedTranscription),
    ConfigChanged {
        section: String,
        key: String,
        value: serde_json::Value,
    },
    Error {
        message: String,
        critical: bool,
    },
}

/// Discriminant of `AppEvent`, used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RecordingStarted,
    RecordingStopped,
    TranscriptionRequested,
    TranscriptionCompleted,
    ConfigChanged,
    Error,
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::RecordingStarted(_) => EventKind::RecordingStarted,
            AppEvent::RecordingStopped(_) => EventKind::RecordingStopped,
            AppEvent::TranscriptionRequested(_) => EventKind::TranscriptionRequested,
            AppEvent::TranscriptionCompleted(_) => EventKind::TranscriptionCompleted,
            AppEvent::ConfigChanged { .. } => EventKind::ConfigChanged,
            AppEvent::Error { .. } => EventKind::Error,
        }
    }
}
