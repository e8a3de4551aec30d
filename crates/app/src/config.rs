//! Application configuration.
//!
//! A TOML file merged over defaults. Sections mirror the components that
//! consume them; unknown keys in the file are ignored, and only recognized
//! `section.key` pairs can be set at runtime.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voxscribe_bus::{AppEvent, EventBus};
use voxscribe_foundation::ConfigError;
use voxscribe_stt::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub db_path: PathBuf,
    /// When false, source audio is deleted after a successful save.
    pub keep_audio_files: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("transcriptions.db"),
            keep_audio_files: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    pub auto_copy: bool,
    /// Paste delivery is a front-end concern; the core only persists the
    /// preference.
    pub auto_paste: bool,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self {
            auto_copy: true,
            auto_paste: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transcriber: EngineConfig,
    pub storage: StorageSettings,
    pub clipboard: ClipboardSettings,
}

/// Owns the config file and publishes `ConfigChanged` on every mutation.
pub struct ConfigManager {
    path: PathBuf,
    bus: Arc<EventBus>,
    current: RwLock<AppConfig>,
}

impl ConfigManager {
    /// Load the file at `path`, or persist defaults when it is missing.
    pub fn load(path: impl Into<PathBuf>, bus: Arc<EventBus>) -> Result<Self, ConfigError> {
        let path = path.into();
        let current = if path.exists() {
            config::Config::builder()
                .add_source(config::File::from(path.clone()))
                .build()?
                .try_deserialize::<AppConfig>()?
        } else {
            let defaults = AppConfig::default();
            write_config(&path, &defaults)?;
            defaults
        };
        Ok(Self {
            path,
            bus,
            current: RwLock::new(current),
        })
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// Apply one recognized `section.key` value, persist the file, and
    /// publish `ConfigChanged`. Setting a key to its current value is a
    /// no-op that publishes nothing.
    pub fn set(
        &self,
        section: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ConfigError> {
        let mut current = self.current.write();
        let mut updated = current.clone();
        apply(&mut updated, section, key, &value)?;
        if updated == *current {
            return Ok(());
        }
        write_config(&self.path, &updated)?;
        *current = updated;
        drop(current);

        self.bus.publish(AppEvent::ConfigChanged {
            section: section.to_string(),
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

fn apply(
    config: &mut AppConfig,
    section: &str,
    key: &str,
    value: &serde_json::Value,
) -> Result<(), ConfigError> {
    match (section, key) {
        ("transcriber", "model_size") => config.transcriber.model_size = as_str(section, key, value)?,
        ("transcriber", "device") => config.transcriber.device = as_str(section, key, value)?,
        ("transcriber", "compute_type") => {
            config.transcriber.compute_type = as_str(section, key, value)?
        }
        ("transcriber", "vad_filter") => config.transcriber.vad_filter = as_bool(section, key, value)?,
        ("transcriber", "vad_threshold") => {
            config.transcriber.vad_threshold = as_f64(section, key, value)?
        }
        ("transcriber", "use_batched") => {
            config.transcriber.use_batched = as_bool(section, key, value)?
        }
        ("transcriber", "batch_size") => {
            config.transcriber.batch_size = as_u64(section, key, value)? as u32
        }
        ("storage", "db_path") => {
            config.storage.db_path = PathBuf::from(as_str(section, key, value)?)
        }
        ("storage", "keep_audio_files") => {
            config.storage.keep_audio_files = as_bool(section, key, value)?
        }
        ("clipboard", "auto_copy") => config.clipboard.auto_copy = as_bool(section, key, value)?,
        ("clipboard", "auto_paste") => config.clipboard.auto_paste = as_bool(section, key, value)?,
        _ => {
            return Err(ConfigError::UnknownKey {
                section: section.to_string(),
                key: key.to_string(),
            })
        }
    }
    Ok(())
}

fn as_str(section: &str, key: &str, value: &serde_json::Value) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| validation(section, key, "expected a string"))
}

fn as_bool(section: &str, key: &str, value: &serde_json::Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| validation(section, key, "expected a boolean"))
}

fn as_f64(section: &str, key: &str, value: &serde_json::Value) -> Result<f64, ConfigError> {
    value
        .as_f64()
        .ok_or_else(|| validation(section, key, "expected a number"))
}

fn as_u64(section: &str, key: &str, value: &serde_json::Value) -> Result<u64, ConfigError> {
    value
        .as_u64()
        .ok_or_else(|| validation(section, key, "expected a non-negative integer"))
}

fn validation(section: &str, key: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
