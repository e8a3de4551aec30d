//! SQLite store for transcription records.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use voxscribe_bus::Segment;
use voxscribe_foundation::StorageError;

/// A persisted transcription plus its storage-assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRecord {
    pub id: i64,
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub text: String,
    pub segments: Vec<Segment>,
    /// Cleared when the underlying audio file is deleted; the text remains.
    pub audio_path: Option<String>,
}

/// Fields recognized by `update`. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    text: Option<String>,
    audio_path: Option<Option<String>>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn audio_path(mut self, path: impl Into<String>) -> Self {
        self.audio_path = Some(Some(path.into()));
        self
    }

    pub fn clear_audio_path(mut self) -> Self {
        self.audio_path = Some(None);
        self
    }

    fn is_empty(&self) -> bool {
        self.text.is_none() && self.audio_path.is_none()
    }
}

/// CRUD gateway over the `transcriptions` table.
///
/// Shared between the reconciler and UI history reads; every public call is
/// a single statement, so no locking beyond the connection mutex is needed.
pub struct TranscriptionStore {
    conn: Mutex<Connection>,
}

impl TranscriptionStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // AUTOINCREMENT keeps deleted ids from ever being reassigned.
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transcriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                text TEXT NOT NULL,
                segments_metadata TEXT NOT NULL,
                audio_path TEXT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a new record and return its id. Rejects empty text.
    pub fn save(
        &self,
        text: &str,
        segments: &[Segment],
        audio_path: Option<&Path>,
    ) -> Result<i64, StorageError> {
        if text.trim().is_empty() {
            return Err(StorageError::EmptyText);
        }
        let timestamp = Utc::now().to_rfc3339();
        let segments_json = serde_json::to_string(segments)?;
        let audio_path = audio_path.map(|p| p.to_string_lossy().into_owned());

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO transcriptions (timestamp, text, segments_metadata, audio_path)
             VALUES (?1, ?2, ?3, ?4)",
            params![timestamp, text, segments_json, audio_path],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, "Saved transcription record");
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Option<TranscriptionRecord>, StorageError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, timestamp, text, segments_metadata, audio_path
                 FROM transcriptions WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;
        row.map(Self::record_from_row).transpose()
    }

    /// Most recent records first.
    pub fn list_recent(&self, limit: u32) -> Result<Vec<TranscriptionRecord>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, text, segments_metadata, audio_path
             FROM transcriptions ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::record_from_row(row?)?);
        }
        Ok(records)
    }

    /// Apply the supplied fields to one record. Returns false when no
    /// recognized field was supplied or the id does not exist.
    pub fn update(&self, id: i64, update: &RecordUpdate) -> Result<bool, StorageError> {
        if update.is_empty() {
            return Ok(false);
        }
        let conn = self.conn.lock();
        let changed = match (&update.text, &update.audio_path) {
            (Some(text), Some(audio_path)) => conn.execute(
                "UPDATE transcriptions SET text = ?1, audio_path = ?2 WHERE id = ?3",
                params![text, audio_path, id],
            )?,
            (Some(text), None) => conn.execute(
                "UPDATE transcriptions SET text = ?1 WHERE id = ?2",
                params![text, id],
            )?,
            (None, Some(audio_path)) => conn.execute(
                "UPDATE transcriptions SET audio_path = ?1 WHERE id = ?2",
                params![audio_path, id],
            )?,
            (None, None) => 0,
        };
        Ok(changed > 0)
    }

    /// Returns false when the id does not exist.
    pub fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM transcriptions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Remove an audio file and clear `audio_path` on every record that
    /// references it. Returns false when the file does not exist.
    pub fn delete_audio(&self, path: &Path) -> Result<bool, StorageError> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        let reference = path.to_string_lossy().into_owned();
        let conn = self.conn.lock();
        let cleared = conn.execute(
            "UPDATE transcriptions SET audio_path = NULL WHERE audio_path = ?1",
            params![reference],
        )?;
        tracing::debug!(path = %reference, cleared, "Deleted audio file");
        Ok(true)
    }

    fn record_from_row(
        (id, timestamp, text, segments_json, audio_path): (
            i64,
            String,
            String,
            String,
            Option<String>,
        ),
    ) -> Result<TranscriptionRecord, StorageError> {
        Ok(TranscriptionRecord {
            id,
            timestamp,
            text,
            segments: serde_json::from_str(&segments_json)?,
            audio_path,
        })
    }
}
