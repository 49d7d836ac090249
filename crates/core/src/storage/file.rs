//! File-backed key-value store
//!
//! Stores every entry in one JSON object on disk.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::{Error, Result};

/// Key-value store persisted as a JSON file
pub struct FileKeyValueStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of entries
    cache: RwLock<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Create a new FileKeyValueStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all entries to disk
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cache = self.cache.read().await;
        Ok(cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.insert(key.to_string(), value.to_string());
        self.persist(&cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("storage.json"))
            .await
            .unwrap();

        assert_eq!(store.get("columns").await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        {
            let store = FileKeyValueStore::new(&path).await.unwrap();
            store.set("columns", r#"[{"id":"a"}]"#).await.unwrap();
            store.set("theme", "dark").await.unwrap();
        }

        let store = FileKeyValueStore::new(&path).await.unwrap();
        assert_eq!(
            store.get("columns").await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        match FileKeyValueStore::new(&path).await {
            Err(Error::Storage(msg)) => assert!(msg.contains("Failed to parse")),
            Err(e) => panic!("Expected Storage error, got: {:?}", e),
            Ok(_) => panic!("Expected Storage error"),
        }
    }
}
