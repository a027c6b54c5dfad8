//! Flat-JSON persistence layer.
//!
//! The platform keeps its state in whole-file JSON documents (`users.json`,
//! `inject_rules.json`, `ledger.json`, `addresses.json`, `admin.json`) under
//! a configurable data directory. Writes go through a temp file + rename so a
//! crash mid-write never leaves a half-written document, and every operation
//! is wrapped in a bounded timeout with a single retry on transient failure.

use serde::{Serialize, de::DeserializeOwned};
use std::path::PathBuf;
use std::time::Duration;

pub mod config;
pub mod timeouts;

pub use config::StoreConfig;
pub use timeouts::{TimeoutError, with_timeout};

use log::warn;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error after retry was exhausted
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out after retry was exhausted
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// Data file exists but cannot be decoded
    #[error("Corrupt data file {file}: {source}")]
    Corrupt {
        file: String,
        source: serde_json::Error,
    },

    /// Data could not be encoded
    #[error("Serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<TimeoutError> for StoreError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(d) => StoreError::Timeout(d),
            TimeoutError::Io(e) => StoreError::Io(e),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-file JSON document store
#[derive(Debug, Clone)]
pub struct JsonStore {
    config: StoreConfig,
}

impl JsonStore {
    /// Create a new store over the configured data directory
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Create the data directory if it does not exist yet
    pub async fn init(&self) -> StoreResult<()> {
        self.retrying(|| tokio::fs::create_dir_all(&self.config.data_dir))
            .await?;
        Ok(())
    }

    /// Check that the data directory is reachable and writable
    pub async fn health_check(&self) -> StoreResult<()> {
        let probe = self.config.data_dir.join(".health");
        self.retrying(|| tokio::fs::write(&probe, b"ok")).await?;
        self.retrying(|| tokio::fs::remove_file(&probe)).await?;
        Ok(())
    }

    /// Load a JSON document, returning `None` when the file does not exist
    ///
    /// # Arguments
    ///
    /// * `name` - File name relative to the data directory, e.g. `users.json`
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> StoreResult<Option<T>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = self.retrying(|| tokio::fs::read(&path)).await?;
        let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            file: name.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    /// Save a JSON document atomically (temp file + rename)
    pub async fn save<T: Serialize>(&self, name: &str, value: &T) -> StoreResult<()> {
        let path = self.path(name);
        let tmp = self.path(&format!("{name}.tmp"));
        let bytes = serde_json::to_vec_pretty(value)?;

        self.retrying(|| tokio::fs::write(&tmp, &bytes)).await?;
        self.retrying(|| tokio::fs::rename(&tmp, &path)).await?;
        Ok(())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(name)
    }

    fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.config.io_timeout_secs)
    }

    /// Run an I/O operation with a bounded timeout, retrying once on failure
    async fn retrying<F, Fut, T>(&self, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::io::Result<T>>,
    {
        match with_timeout(self.io_timeout(), op()).await {
            Ok(value) => Ok(value),
            Err(first) => {
                warn!("storage operation failed, retrying once: {first}");
                with_timeout(self.io_timeout(), op())
                    .await
                    .map_err(StoreError::from)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        value: u32,
    }

    fn temp_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::new(StoreConfig::with_dir(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_none() {
        let (_dir, store) = temp_store();
        store.init().await.unwrap();
        let loaded: Option<Doc> = store.load("missing.json").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let (_dir, store) = temp_store();
        store.init().await.unwrap();
        store.save("doc.json", &Doc { value: 7 }).await.unwrap();
        let loaded: Option<Doc> = store.load("doc.json").await.unwrap();
        assert_eq!(loaded, Some(Doc { value: 7 }));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let (dir, store) = temp_store();
        store.init().await.unwrap();
        tokio::fs::write(dir.path().join("bad.json"), b"{not json")
            .await
            .unwrap();
        let err = store.load::<Doc>("bad.json").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, store) = temp_store();
        store.init().await.unwrap();
        store.health_check().await.unwrap();
    }
}
