//! Persistence for readings and medications.
//!
//! [`FileStorage`] keeps two JSON files under a data directory:
//! `health_history.json` (an array of [`HealthRecord`]) and
//! `medication_alerts.json` (an array of [`Medication`]). Every write
//! rewrites the whole file under a lock, so one process can safely share a
//! storage handle between tasks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use vitals::{HealthRecord, Medication};

/// Health history file name.
pub const HISTORY_FILE: &str = "health_history.json";

/// Medication schedule file name.
pub const MEDICATIONS_FILE: &str = "medication_alerts.json";

/// Default number of rows returned by [`Storage::recent_readings`].
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Medication not found: {0}")]
    NotFound(String),

    /// A row failed validation before it was written
    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend for readings and medication schedules.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create whatever the backend needs before first use.
    async fn initialize(&self) -> StorageResult<()>;

    async fn insert_reading(&self, record: &HealthRecord) -> StorageResult<()>;

    /// Most recent readings for `user_id`, newest first.
    async fn recent_readings(&self, user_id: &str, limit: usize)
        -> StorageResult<Vec<HealthRecord>>;

    /// Add a medication. Name and dosage must be non-empty.
    async fn add_medication(&self, medication: Medication) -> StorageResult<Medication>;

    /// Medications for `user_id`, ordered by scheduled time.
    async fn list_medications(&self, user_id: &str) -> StorageResult<Vec<Medication>>;

    async fn mark_taken(&self, id: &str) -> StorageResult<Medication>;

    async fn delete_medication(&self, id: &str) -> StorageResult<()>;
}

/// JSON file storage.
pub struct FileStorage {
    data_dir: PathBuf,
    history_file: PathBuf,
    medications_file: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            history_file: data_dir.join(HISTORY_FILE),
            medications_file: data_dir.join(MEDICATIONS_FILE),
            data_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Read a JSON array, treating a missing file as empty.
    async fn read_rows<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
        match fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::FileRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn write_rows<T: Serialize + Sync>(path: &Path, rows: &[T]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::FileWrite {
                    path: parent.display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        let content = serde_json::to_string_pretty(rows)?;
        fs::write(path, content)
            .await
            .map_err(|e| StorageError::FileWrite {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        for path in [&self.history_file, &self.medications_file] {
            if fs::try_exists(path).await.unwrap_or(false) {
                continue;
            }
            Self::write_rows::<serde_json::Value>(path, &[]).await?;
            debug!(path = %path.display(), "Created data file");
        }
        Ok(())
    }

    async fn insert_reading(&self, record: &HealthRecord) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut rows: Vec<HealthRecord> = Self::read_rows(&self.history_file).await?;
        rows.push(record.clone());
        Self::write_rows(&self.history_file, &rows).await?;
        debug!(record_id = %record.id, total = rows.len(), "Stored reading");
        Ok(())
    }

    async fn recent_readings(
        &self,
        user_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<HealthRecord>> {
        let _guard = self.lock.lock().await;
        let mut rows: Vec<HealthRecord> = Self::read_rows(&self.history_file).await?;
        rows.retain(|r| r.user_id == user_id);
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn add_medication(&self, medication: Medication) -> StorageResult<Medication> {
        if medication.medication_name.trim().is_empty() {
            return Err(StorageError::Validation(
                "medication name is required".to_string(),
            ));
        }
        if medication.dosage.trim().is_empty() {
            return Err(StorageError::Validation("dosage is required".to_string()));
        }

        let _guard = self.lock.lock().await;
        let mut rows: Vec<Medication> = Self::read_rows(&self.medications_file).await?;
        rows.push(medication.clone());
        Self::write_rows(&self.medications_file, &rows).await?;
        debug!(medication_id = %medication.id, "Added medication");
        Ok(medication)
    }

    async fn list_medications(&self, user_id: &str) -> StorageResult<Vec<Medication>> {
        let _guard = self.lock.lock().await;
        let mut rows: Vec<Medication> = Self::read_rows(&self.medications_file).await?;
        rows.retain(|m| m.user_id == user_id);
        rows.sort_by_key(|m| m.scheduled_time);
        Ok(rows)
    }

    async fn mark_taken(&self, id: &str) -> StorageResult<Medication> {
        let _guard = self.lock.lock().await;
        let mut rows: Vec<Medication> = Self::read_rows(&self.medications_file).await?;
        let medication = rows
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        medication.mark_taken(Utc::now());
        let updated = medication.clone();
        Self::write_rows(&self.medications_file, &rows).await?;
        Ok(updated)
    }

    async fn delete_medication(&self, id: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut rows: Vec<Medication> = Self::read_rows(&self.medications_file).await?;
        let before = rows.len();
        rows.retain(|m| m.id != id);
        if rows.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Self::write_rows(&self.medications_file, &rows).await
    }
}
