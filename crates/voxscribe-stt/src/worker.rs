//! Background transcription worker.
//!
//! A dedicated thread owns the engine instance, drains the job queue with a
//! bounded poll so stop requests are observed promptly, and returns results
//! through the result queue. Exactly one worker drains a given job queue.

use crate::config::EngineConfig;
use crate::state::{WorkerState, WorkerStateCell};
use crate::TranscriptionEngine;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use voxscribe_bus::{
    AppEvent, CompletedTranscription, EventBus, HandoffQueue, TranscriptionJob,
    TranscriptionResult,
};
use voxscribe_foundation::{ShutdownToken, SttError};

/// Worker construction options.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub engine: EngineConfig,
    /// Upper bound on how long a stop request can go unobserved.
    pub poll_interval: Duration,
    /// Process at most this many jobs, then exit; used by deterministic
    /// single-job test harnesses.
    pub max_loops: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            poll_interval: Duration::from_secs(1),
            max_loops: None,
        }
    }
}

/// Builds the engine inside the worker thread, so a slow or failing model
/// load never blocks the spawning context.
pub type EngineFactory =
    Box<dyn FnOnce(&EngineConfig) -> Result<Box<dyn TranscriptionEngine>, SttError> + Send>;

pub struct TranscriberWorker;

/// Handle to a spawned worker.
pub struct WorkerHandle {
    stop: ShutdownToken,
    state: Arc<WorkerStateCell>,
    done_rx: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl TranscriberWorker {
    pub fn spawn(
        config: WorkerConfig,
        bus: Arc<EventBus>,
        jobs: HandoffQueue<TranscriptionJob>,
        results: HandoffQueue<TranscriptionResult>,
        engine_factory: EngineFactory,
    ) -> Result<WorkerHandle, SttError> {
        let stop = ShutdownToken::new();
        let state = Arc::new(WorkerStateCell::new());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        let thread_stop = stop.clone();
        let thread_state = state.clone();
        let handle = thread::Builder::new()
            .name("transcriber-worker".to_string())
            .spawn(move || {
                run(
                    config,
                    bus,
                    jobs,
                    results,
                    engine_factory,
                    thread_stop,
                    thread_state,
                );
                let _ = done_tx.send(());
            })
            .map_err(|e| SttError::SpawnFailed(e.to_string()))?;

        Ok(WorkerHandle {
            stop,
            state,
            done_rx,
            thread: Some(handle),
        })
    }
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        self.state.current()
    }

    /// Receiver yielding every state the worker enters, in order.
    pub fn state_changes(&self) -> Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Request a cooperative stop. The loop observes the flag at the top of
    /// each iteration, bounded by the poll interval.
    pub fn stop(&self) {
        self.stop.request();
    }

    /// Stop the worker and wait up to `timeout` for the thread to exit.
    ///
    /// A transcription call has no cancellation hook, so a stuck engine can
    /// outlive the grace period; in that case the thread is detached and
    /// `false` is returned, keeping application exit unblocked.
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        self.stop.request();
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.thread.take() {
                    let _ = handle.join();
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Transcriber worker did not stop within {:?}; detaching thread",
                    timeout
                );
                self.thread.take();
                false
            }
        }
    }
}

fn run(
    config: WorkerConfig,
    bus: Arc<EventBus>,
    jobs: HandoffQueue<TranscriptionJob>,
    results: HandoffQueue<TranscriptionResult>,
    engine_factory: EngineFactory,
    stop: ShutdownToken,
    state: Arc<WorkerStateCell>,
) {
    // Transitions are driven only from this thread; a rejected one is a bug
    // in the machine itself, so it is logged rather than propagated.
    let enter = |next: WorkerState| {
        if let Err(e) = state.transition(next) {
            tracing::error!("Unexpected worker transition rejection: {}", e);
        }
    };

    enter(WorkerState::LoadingModel);
    let mut engine: Box<dyn TranscriptionEngine> = match engine_factory(&config.engine) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to initialize transcription engine: {}", e);
            bus.publish(AppEvent::Error {
                message: format!("transcription engine failed to initialize: {e}"),
                critical: true,
            });
            enter(WorkerState::Failed {
                reason: e.to_string(),
            });
            return;
        }
    };

    tracing::info!(
        model_size = %config.engine.model_size,
        device = %config.engine.device,
        compute_type = %config.engine.compute_type,
        "Transcriber worker ready"
    );
    enter(WorkerState::Ready);
    enter(WorkerState::Idle);

    let mut jobs_done: u64 = 0;
    loop {
        if stop.is_requested() {
            break;
        }
        if let Some(max) = config.max_loops {
            if jobs_done >= max {
                tracing::info!("Worker reached max_loops={}; exiting", max);
                break;
            }
        }

        let Some(job) = jobs.pop(config.poll_interval) else {
            continue;
        };

        enter(WorkerState::Running);
        let audio_path = job.audio_path;
        tracing::info!("Transcribing file: {}", audio_path.display());
        bus.publish(AppEvent::TranscriptionRequested(audio_path.clone()));

        match engine.transcribe(&audio_path) {
            Ok(output) => {
                let result = TranscriptionResult {
                    audio_path: audio_path.clone(),
                    text: output.text,
                    segments: output.segments,
                    language: output.language,
                    language_probability: output.language_probability,
                };
                if let Err(e) = results.push(result.clone()) {
                    tracing::error!("Failed to enqueue transcription result: {}", e);
                } else {
                    tracing::info!("Transcription complete for: {}", audio_path.display());
                }
                bus.publish(AppEvent::TranscriptionCompleted(CompletedTranscription::Raw(
                    result,
                )));
            }
            Err(e) => {
                // Per-job failure: the job is dropped, no result is
                // produced, and the loop continues with the next job.
                tracing::error!("Transcription failed for {}: {}", audio_path.display(), e);
                bus.publish(AppEvent::Error {
                    message: format!("transcription failed for {}: {e}", audio_path.display()),
                    critical: false,
                });
            }
        }
        jobs_done += 1;
        enter(WorkerState::Idle);
    }

    enter(WorkerState::Stopping);
    enter(WorkerState::Stopped);
    tracing::info!("Transcriber worker stopped after {} job(s)", jobs_done);
}
