//! Pipeline assembly.
//!
//! `Runtime::start` wires the queues, worker, reconciler, and store together
//! from an `AppConfig`; `shutdown` tears them down in dependency order.

use crate::config::AppConfig;
use crate::reconciler::{Reconciler, ReconcilerHandle};
use std::sync::Arc;
use std::time::Duration;
use voxscribe_bus::{
    EventBus, HandoffQueue, TranscriptionJob, TranscriptionResult, RESULT_QUEUE,
    TRANSCRIPTION_QUEUE,
};
use voxscribe_foundation::{VoxScribeError, SttError};
use voxscribe_stt::{EngineFactory, TranscriberWorker, WorkerConfig, WorkerHandle, WorkerState};
use voxscribe_storage::TranscriptionStore;

#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    /// Worker poll interval; bounds stop latency.
    pub poll_interval: Duration,
    /// Reconciler poll interval.
    pub reconcile_interval: Duration,
    /// Process at most this many jobs, then stop the worker.
    pub max_loops: Option<u64>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            reconcile_interval: Duration::from_millis(250),
            max_loops: None,
        }
    }
}

/// A running pipeline: one worker, one reconciler, one store.
pub struct Runtime {
    jobs: HandoffQueue<TranscriptionJob>,
    store: Arc<TranscriptionStore>,
    worker: WorkerHandle,
    reconciler: ReconcilerHandle,
}

impl Runtime {
    pub fn start(
        config: &AppConfig,
        opts: RuntimeOptions,
        bus: Arc<EventBus>,
        engine_factory: EngineFactory,
    ) -> Result<Self, VoxScribeError> {
        let jobs = bus.create_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)?;
        let results = bus.create_queue::<TranscriptionResult>(RESULT_QUEUE)?;

        let store = Arc::new(TranscriptionStore::open(&config.storage.db_path)?);

        let worker = TranscriberWorker::spawn(
            WorkerConfig {
                engine: config.transcriber.clone(),
                poll_interval: opts.poll_interval,
                max_loops: opts.max_loops,
            },
            bus.clone(),
            jobs.clone(),
            results.clone(),
            engine_factory,
        )?;

        let reconciler = Reconciler::new(
            bus,
            store.clone(),
            results,
            config.storage.keep_audio_files,
        )
        .spawn(opts.reconcile_interval)
        .map_err(|e| SttError::SpawnFailed(e.to_string()))?;

        Ok(Self {
            jobs,
            store,
            worker,
            reconciler,
        })
    }

    /// Queue one audio file for transcription.
    pub fn enqueue(&self, audio_path: impl Into<std::path::PathBuf>) -> Result<(), VoxScribeError> {
        self.jobs.push(TranscriptionJob::new(audio_path))?;
        Ok(())
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    pub fn store(&self) -> &Arc<TranscriptionStore> {
        &self.store
    }

    /// Stop the worker (waiting up to `timeout`), then drain and join the
    /// reconciler. Returns false when the worker had to be detached.
    pub fn shutdown(self, timeout: Duration) -> bool {
        let clean = self.worker.shutdown(timeout);
        self.reconciler.join();
        clean
    }
}
