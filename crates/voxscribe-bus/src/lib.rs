//! Event bus and hand-off queues.
//!
//! One `EventBus` is constructed per running application and passed by
//! `Arc` to every component. It carries two things: a typed
//! publish/subscribe registry for fire-and-forget notifications, and a set
//! of named FIFO queues used to move transcription jobs and results between
//! execution contexts without blocking either side indefinitely.

pub mod bus;
pub mod event;
pub mod queue;

pub use bus::{EventBus, SubscriptionId};
pub use event::{
    AppEvent, CompletedTranscription, EventKind, Segment, TranscriptionJob, TranscriptionResult,
};
pub use queue::HandoffQueue;

/// Well-known queue name for pending transcription jobs.
pub const TRANSCRIPTION_QUEUE: &str = "transcription";

/// Well-known queue name for completed transcription results.
pub const RESULT_QUEUE: &str = "result";
