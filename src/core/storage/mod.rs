//! Durable Key-Value Storage Port
//!
//! Generic string key-value persistence behind a trait, decoupled from any
//! specific storage technology. The wizard's preference cache is the only
//! in-crate consumer; it must keep working when the backing store is
//! unavailable, so every failure here is surfaced as a recoverable error.
//!
//! Backends:
//! - [`JsonFileKv`]: a single JSON document on disk, written atomically
//! - [`MemoryKv`]: in-memory test double

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

/// Errors from a key-value backend. Callers treat all variants as non-fatal.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Generic get/set port used under a fixed namespace key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), KvError>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> Result<(), KvError>;
}

// ============================================================================
// JSON File Backend
// ============================================================================

/// File-backed store: one JSON object mapping keys to values.
///
/// Reads tolerate a missing file (empty map). Writes go through a sibling
/// temp file and an atomic rename so a crash never leaves a torn document.
pub struct JsonFileKv {
    path: PathBuf,
}

impl JsonFileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_map(&self) -> Result<HashMap<String, Value>, KvError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_map(&self, map: &HashMap<String, Value>) -> Result<(), KvError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KvStore for JsonFileKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Backend (test double)
// ============================================================================

/// In-memory store. Also usable as a deliberately failing double via
/// [`MemoryKv::unavailable`] to exercise degraded-backend paths.
#[derive(Default)]
pub struct MemoryKv {
    map: RwLock<HashMap<String, Value>>,
    unavailable: bool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fails every operation, simulating an unreachable store.
    pub fn unavailable() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            unavailable: true,
        }
    }

    fn check(&self) -> Result<(), KvError> {
        if self.unavailable {
            Err(KvError::Unavailable(
                "memory store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        self.check()?;
        Ok(self
            .map
            .read()
            .expect("kv lock poisoned")
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        self.check()?;
        self.map
            .write()
            .expect("kv lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.check()?;
        self.map.write().expect("kv lock poisoned").remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert!(kv.get("missing").await.unwrap().is_none());

        kv.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some(json!({"a": 1})));

        kv.delete("k").await.unwrap();
        assert!(kv.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_kv_unavailable() {
        let kv = MemoryKv::unavailable();
        assert!(kv.get("k").await.is_err());
        assert!(kv.set("k", json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_json_file_kv_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::new(dir.path().join("prefs.json"));
        assert!(kv.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_kv_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let kv = JsonFileKv::new(&path);
        kv.set("profile", json!({"style": "modern"})).await.unwrap();

        let reopened = JsonFileKv::new(&path);
        assert_eq!(
            reopened.get("profile").await.unwrap(),
            Some(json!({"style": "modern"}))
        );
    }

    #[tokio::test]
    async fn test_json_file_kv_set_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::new(dir.path().join("prefs.json"));
        kv.set("k", json!("old")).await.unwrap();
        kv.set("k", json!("new")).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some(json!("new")));
    }
}
