//! Result reconciliation.
//!
//! Drains the result queue, persists each transcription, optionally removes
//! the source audio, and republishes `TranscriptionCompleted` enriched with
//! the storage-assigned id. A save failure drops the result; it is logged
//! and surfaced as a non-critical `Error` event, never retried.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use voxscribe_bus::{AppEvent, CompletedTranscription, EventBus, HandoffQueue, TranscriptionResult};
use voxscribe_foundation::ShutdownToken;
use voxscribe_storage::TranscriptionStore;

pub struct Reconciler {
    bus: Arc<EventBus>,
    store: Arc<TranscriptionStore>,
    results: HandoffQueue<TranscriptionResult>,
    /// When false, the source audio file is deleted after a successful save.
    keep_audio_files: bool,
}

impl Reconciler {
    pub fn new(
        bus: Arc<EventBus>,
        store: Arc<TranscriptionStore>,
        results: HandoffQueue<TranscriptionResult>,
        keep_audio_files: bool,
    ) -> Self {
        Self {
            bus,
            store,
            results,
            keep_audio_files,
        }
    }

    /// Drain everything currently queued without blocking. Returns the
    /// number of results processed; suitable for a UI timer tick.
    pub fn poll_once(&self) -> usize {
        let mut processed = 0;
        while let Some(result) = self.results.try_pop() {
            self.reconcile(result);
            processed += 1;
        }
        processed
    }

    fn reconcile(&self, result: TranscriptionResult) {
        let id = match self.store.save(
            &result.text,
            &result.segments,
            Some(&result.audio_path),
        ) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    "Failed to save transcription for {}: {}",
                    result.audio_path.display(),
                    e
                );
                self.bus.publish(AppEvent::Error {
                    message: format!(
                        "failed to save transcription for {}: {e}",
                        result.audio_path.display()
                    ),
                    critical: false,
                });
                return;
            }
        };

        if !self.keep_audio_files {
            // Cleanup failure is not worth losing the saved record over.
            match self.store.delete_audio(&result.audio_path) {
                Ok(true) => {
                    tracing::debug!("Removed audio file: {}", result.audio_path.display())
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    "Failed to remove audio file {}: {}",
                    result.audio_path.display(),
                    e
                ),
            }
        }

        tracing::info!(id, "Transcription reconciled");
        self.bus
            .publish(AppEvent::TranscriptionCompleted(CompletedTranscription::Saved {
                id,
                text: result.text,
                segments: result.segments,
            }));
    }

    /// Move the reconciler onto its own polling thread.
    pub fn spawn(self, poll_interval: Duration) -> std::io::Result<ReconcilerHandle> {
        let stop = ShutdownToken::new();
        let thread_stop = stop.clone();
        let thread = thread::Builder::new()
            .name("reconciler".to_string())
            .spawn(move || {
                while !thread_stop.is_requested() {
                    if let Some(result) = self.results.pop(poll_interval) {
                        self.reconcile(result);
                    }
                }
                // Final drain so results queued during shutdown still land.
                let drained = self.poll_once();
                tracing::info!(drained, "Reconciler stopped");
            })?;

        Ok(ReconcilerHandle {
            stop,
            thread: Some(thread),
        })
    }
}

pub struct ReconcilerHandle {
    stop: ShutdownToken,
    thread: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    pub fn stop(&self) {
        self.stop.request();
    }

    /// Stop and wait for the thread; bounded by one poll interval plus any
    /// in-flight save.
    pub fn join(mut self) {
        self.stop.request();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
