//! Persistent transcription records.
//!
//! CRUD over a single SQLite table. Record ids are storage-assigned,
//! immutable, and never reused, even after deletion.

pub mod store;

pub use store::{RecordUpdate, TranscriptionRecord, TranscriptionStore};
