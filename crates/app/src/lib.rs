//! VoxScribe application wiring.
//!
//! Connects the event bus, transcription worker, result reconciler, and
//! storage gateway into a running pipeline, and exposes the configuration
//! surface consumed by all of them.

pub mod clipboard;
pub mod config;
pub mod reconciler;
pub mod runtime;

pub use clipboard::LastTranscript;
pub use config::{AppConfig, ClipboardSettings, ConfigManager, StorageSettings};
pub use reconciler::{Reconciler, ReconcilerHandle};
pub use runtime::{Runtime, RuntimeOptions};
