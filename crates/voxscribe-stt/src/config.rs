//! Engine configuration surface.

use serde::{Deserialize, Serialize};

/// Options consumed by the transcription engine. Unknown keys in a config
/// file are ignored on deserialization; only these are recognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model identifier, e.g. "tiny", "base", "small".
    pub model_size: String,
    /// Execution device, e.g. "cpu" or "cuda".
    pub device: String,
    /// Compute precision, e.g. "int8", "float16".
    pub compute_type: String,
    /// Enable voice-activity-detection filtering.
    pub vad_filter: bool,
    /// Minimum silence duration treated as a segment break, in seconds.
    pub vad_threshold: f64,
    /// Use the batched inference path (non-CPU devices only).
    pub use_batched: bool,
    pub batch_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_size: "base".to_string(),
            device: "cpu".to_string(),
            compute_type: "int8".to_string(),
            vad_filter: true,
            vad_threshold: 2.0,
            use_batched: false,
            batch_size: 8,
        }
    }
}
