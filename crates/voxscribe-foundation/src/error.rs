use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxScribeError {
    #[error("Event bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Transcription error: {0}")]
    Stt(#[from] SttError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum BusError {
    #[error("No queue registered under {name:?}")]
    QueueNotFound { name: String },

    #[error("Queue {name:?} exists with a different payload type")]
    QueueTypeMismatch { name: String },

    #[error("Queue {name:?} is disconnected")]
    QueueDisconnected { name: String },
}

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Transcription failed for {path}: {reason}")]
    TranscriptionFailed { path: String, reason: String },

    #[error("Audio unreadable: {path}")]
    AudioUnreadable { path: String },

    #[error("Invalid worker state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("text must be a non-empty string")]
    EmptyText,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Segment serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unrecognized config key: {section}.{key}")]
    UnknownKey { section: String, key: String },

    #[error("Invalid value for {section}.{key}: {reason}")]
    Validation {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Failed to persist config: {0}")]
    Io(#[from] std::io::Error),
}
