//! Dump payload storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use super::StoreError;

/// Write-only key/value store for dump bodies.
///
/// Writes are unconditional: an existing value under the same key is
/// replaced.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError>;
}

/// In-memory blob store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.blobs.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key.to_string(), body);
        Ok(())
    }
}

/// Blob store that writes each key as a file below `root`.
///
/// `/` in a key maps to a directory separator, so `app/abc123` lands in
/// `<root>/app/abc123`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` to a path inside the root, rejecting anything that could
    /// escape it.
    ///
    /// A single leading `/` is ignored: an application with an empty prefix
    /// produces keys like `/abc123` in notify mode.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = key.strip_prefix('/').unwrap_or(key);
        if relative.is_empty() || relative.contains(['\\', '\0']) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        let mut path = self.root.clone();
        for part in relative.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(StoreError::InvalidKey(key.to_string()));
            }
            path.push(part);
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("log-server-blobs-{}", crate::util::short_id(12)))
    }

    #[tokio::test]
    async fn test_memory_store_put_overwrites() {
        let store = MemoryBlobStore::new();
        store.put("foo_abc123", Bytes::from_static(b"one")).await.unwrap();
        store.put("foo_abc123", Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("foo_abc123").await, Some(Bytes::from_static(b"two")));
    }

    #[tokio::test]
    async fn test_fs_store_writes_nested_keys() {
        let root = temp_root();
        let store = FsBlobStore::new(&root);

        store.put("foo/abc123", Bytes::from_static(b"hello")).await.unwrap();
        store.put("foo_xyz789", Bytes::from_static(b"world")).await.unwrap();

        assert_eq!(std::fs::read(root.join("foo").join("abc123")).unwrap(), b"hello");
        assert_eq!(std::fs::read(root.join("foo_xyz789")).unwrap(), b"world");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_fs_store_rejects_escaping_keys() {
        let store = FsBlobStore::new("/tmp/unused");

        for key in ["", "/", "//abs", "a//b", "../up", "/../up", "a/../b", ".", "a/", "a\\b"] {
            assert!(
                matches!(store.path_for(key), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(store.path_for("foo/-_aZ09").is_ok());
    }

    #[tokio::test]
    async fn test_fs_store_accepts_empty_prefix_keys() {
        let root = temp_root();
        let store = FsBlobStore::new(&root);

        store.put("/abc123", Bytes::from_static(b"hello")).await.unwrap();

        assert_eq!(std::fs::read(root.join("abc123")).unwrap(), b"hello");
        assert_eq!(store.path_for("/abc123").unwrap(), root.join("abc123"));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
