//! Worker lifecycle state machine.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use voxscribe_foundation::SttError;

/// Lifecycle of one worker instance.
///
/// `Failed` is absorbing: a worker that fails to build its engine never
/// processes jobs and must be respawned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerState {
    Created,
    LoadingModel,
    Ready,
    Idle,
    Running,
    Stopping,
    Stopped,
    Failed { reason: String },
}

impl WorkerState {
    fn name(&self) -> &'static str {
        match self {
            WorkerState::Created => "Created",
            WorkerState::LoadingModel => "LoadingModel",
            WorkerState::Ready => "Ready",
            WorkerState::Idle => "Idle",
            WorkerState::Running => "Running",
            WorkerState::Stopping => "Stopping",
            WorkerState::Stopped => "Stopped",
            WorkerState::Failed { .. } => "Failed",
        }
    }
}

/// Shared, observable worker state with validated transitions.
pub struct WorkerStateCell {
    state: Arc<RwLock<WorkerState>>,
    state_tx: Sender<WorkerState>,
    state_rx: Receiver<WorkerState>,
}

impl Default for WorkerStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerStateCell {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(WorkerState::Created)),
            state_tx,
            state_rx,
        }
    }

    pub fn transition(&self, new_state: WorkerState) -> Result<(), SttError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (WorkerState::Created, WorkerState::LoadingModel)
                | (WorkerState::LoadingModel, WorkerState::Ready)
                | (WorkerState::LoadingModel, WorkerState::Failed { .. })
                | (WorkerState::Ready, WorkerState::Idle)
                | (WorkerState::Ready, WorkerState::Running)
                | (WorkerState::Ready, WorkerState::Stopping)
                | (WorkerState::Idle, WorkerState::Running)
                | (WorkerState::Idle, WorkerState::Stopping)
                | (WorkerState::Running, WorkerState::Idle)
                | (WorkerState::Running, WorkerState::Stopping)
                | (WorkerState::Running, WorkerState::Failed { .. })
                | (WorkerState::Stopping, WorkerState::Stopped)
        );

        if !valid {
            return Err(SttError::InvalidTransition {
                from: current.name().to_string(),
                to: new_state.name().to_string(),
            });
        }

        tracing::debug!("Worker state: {:?} -> {:?}", *current, new_state);
        *current = new_state.clone();
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    pub fn current(&self) -> WorkerState {
        self.state.read().clone()
    }

    /// Receiver yielding every state the worker enters, in order.
    pub fn subscribe(&self) -> Receiver<WorkerState> {
        self.state_rx.clone()
    }
}
