//! Object store implementations
//!
//! - [`LocalObjectStore`]: `<root>/<bucket>/<key>` on the local filesystem
//! - [`MemoryObjectStore`]: in-process map, used by tests and demos

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use contracts::{ContractError, ObjectStore, Value};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Filesystem-backed store
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an object maps to; rejects keys escaping the root
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ContractError> {
        let escapes = |s: &str| s.split('/').any(|part| part == "..");
        if bucket.is_empty() || bucket.contains('/') || escapes(bucket) || escapes(key) {
            return Err(ContractError::fetch(
                format!("{bucket}/{key}"),
                "invalid bucket or key",
            ));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, ContractError> {
        let path = self.object_path(bucket, key)?;
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| ContractError::fetch(format!("{bucket}/{key}"), format!("{}: {e}", path.display())))
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `bucket/key`, replacing any previous object
    pub fn put(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert((bucket.to_string(), key.to_string()), data.into());
        }
    }

    /// Store a gzip-compressed `{"Records": [...]}` log document
    pub fn put_log_document(&self, bucket: &str, key: &str, records: &[Value]) -> std::io::Result<()> {
        let document = serde_json::json!({ "Records": records });
        let compressed = gzip(document.to_string().as_bytes())?;
        self.put(bucket, key, compressed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, ContractError> {
        let objects = self
            .objects
            .lock()
            .map_err(|_| ContractError::fetch(format!("{bucket}/{key}"), "object map poisoned"))?;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ContractError::fetch(format!("{bucket}/{key}"), "no such key"))
    }
}

/// Gzip-compress a buffer
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_and_missing() {
        let store = MemoryObjectStore::new();
        store.put("b", "k", "hello");
        assert_eq!(store.get_object("b", "k").await.unwrap(), Bytes::from("hello"));
        let err = store.get_object("b", "other").await.unwrap_err();
        assert!(matches!(err, ContractError::Fetch { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_local_store_maps_bucket_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("logs/2024")).unwrap();
        std::fs::write(dir.path().join("logs/2024/a.json"), b"{}").unwrap();

        let store = LocalObjectStore::new(dir.path());
        assert_eq!(store.get_object("logs", "2024/a.json").await.unwrap(), Bytes::from("{}"));
        assert!(store.get_object("logs", "missing.json").await.is_err());
        assert!(store.get_object("logs", "../escape").await.is_err());
    }
}
