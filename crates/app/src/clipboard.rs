//! Keeps the text of the most recently saved transcription available for
//! copy/paste front ends. Subscribes to the enriched completion event, so
//! only records that actually reached storage are exposed.

use parking_lot::RwLock;
use std::sync::Arc;
use voxscribe_bus::{AppEvent, CompletedTranscription, EventBus, EventKind};

#[derive(Clone, Default)]
pub struct LastTranscript {
    latest: Arc<RwLock<Option<String>>>,
}

impl LastTranscript {
    /// Create and subscribe. The subscription lives as long as the bus.
    pub fn attach(bus: &EventBus) -> Self {
        let this = Self::default();
        let latest = this.latest.clone();
        bus.subscribe(EventKind::TranscriptionCompleted, move |event| {
            if let AppEvent::TranscriptionCompleted(CompletedTranscription::Saved {
                text, ..
            }) = event
            {
                *latest.write() = Some(text.clone());
            }
        });
        this
    }

    pub fn current(&self) -> Option<String> {
        self.latest.read().clone()
    }
}
