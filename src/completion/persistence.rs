//! Key-value persistence for completion state
//!
//! The completion store never touches storage directly. It talks to a
//! [`KeyValueStore`], so the host decides where snapshots live.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{Result, StoreError, SumoqlError};

/// Asynchronous string-keyed JSON store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`; `None` deletes the key
    async fn set(&self, key: &str, value: Option<Value>) -> Result<()>;
}

/// Process-local store, used for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Option<Value>) -> Result<()> {
        let mut entries = self.entries.write().await;
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// The whole file is re-read on every access so separate processes see each
/// other's writes. Writes go to a sibling temp file that is then renamed over
/// the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e).into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(StoreError::Corrupted(self.path.display().to_string()).into()),
        }
    }

    /// Where an unreadable state file is moved before it is rewritten
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Read the current entries for a read-modify-write cycle
    ///
    /// An unreadable file is moved to [`JsonFileStore::backup_path`] and the
    /// cycle starts from an empty object, so one bad write does not block
    /// every later one.
    async fn read_for_update(&self) -> Result<Map<String, Value>> {
        match self.read_all().await {
            Err(SumoqlError::Store(StoreError::Corrupted(_))) => {
                let backup = self.backup_path();
                warn!(
                    "{} is not a valid state file, moving it to {}",
                    self.path.display(),
                    backup.display()
                );
                tokio::fs::rename(&self.path, &backup)
                    .await
                    .map_err(|e| self.io_error(e))?;
                Ok(Map::new())
            }
            other => other,
        }
    }

    async fn write_all(&self, entries: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Wrote completion state to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Option<Value>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_for_update().await?;

        match value {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                if entries.remove(key).is_none() {
                    return Ok(());
                }
            }
        }

        self.write_all(entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_memory_store_set_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", Some(json!({"a": 1}))).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.len().await, 1);

        store.set("k", None).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let first = JsonFileStore::new(&path);
        first.set("p.one", Some(json!([1, 2]))).await.unwrap();
        first.set("p.two", Some(json!("x"))).await.unwrap();

        let second = JsonFileStore::new(&path);
        assert_eq!(second.get("p.one").await.unwrap(), Some(json!([1, 2])));

        second.set("p.one", None).await.unwrap();
        assert!(first.get("p.one").await.unwrap().is_none());
        assert_eq!(first.get("p.two").await.unwrap(), Some(json!("x")));
    }

    #[tokio::test]
    async fn test_file_store_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("k").await,
            Err(SumoqlError::Store(StoreError::Corrupted(_)))
        ));
    }

    #[tokio::test]
    async fn test_write_recovers_from_unparseable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{truncated").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.get("p").await.is_err());

        store.set("p", Some(json!({"partitions": ["audit"]}))).await.unwrap();
        assert_eq!(
            store.get("p").await.unwrap(),
            Some(json!({"partitions": ["audit"]}))
        );

        let backup = tokio::fs::read_to_string(store.backup_path()).await.unwrap();
        assert_eq!(backup, "{truncated");
    }

    #[tokio::test]
    async fn test_delete_on_unparseable_file_succeeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{truncated").await.unwrap();

        let store = JsonFileStore::new(&path);
        store.set("p", None).await.unwrap();

        assert!(store.get("p").await.unwrap().is_none());
        assert!(store.backup_path().exists());
    }
}
