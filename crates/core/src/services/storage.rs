//! Media storage backends.

use async_trait::async_trait;
use givehub_common::{AppError, AppResult};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage backend trait for file operations.
///
/// Storage is not transactional; callers clean up keys they no longer reference.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Save file data under `key`, replacing any existing file.
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()>;

    /// Delete a file from storage. Missing files are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get the public URL for a file.
    fn get_url(&self, key: &str) -> String;
}

/// Type alias for the storage service.
pub type StorageService = Arc<dyn StorageBackend>;

fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    /// Base directory for storing files.
    base_path: PathBuf,
    /// Base URL for accessing files.
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Resolve a key below the base directory, refusing anything that escapes it.
    fn get_path(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(AppError::Storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.get_path(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.get_path(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.get_path(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat file: {e}")))
    }

    fn get_url(&self, key: &str) -> String {
        public_url(&self.base_url, key)
    }
}

/// In-memory storage backend for tests.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_url: String,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: Arc::default(),
            base_url: base_url.into(),
        }
    }

    /// Stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Contents stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(key).cloned()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.files
            .lock()
            .map_err(|_| AppError::Storage("Storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    fn get_url(&self, key: &str) -> String {
        public_url(&self.base_url, key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new("/storage");
        storage.save("stories/2025/01/a.jpg", b"jpeg").await.unwrap();

        assert!(storage.exists("stories/2025/01/a.jpg").await.unwrap());
        assert_eq!(storage.get_url("stories/2025/01/a.jpg"), "/storage/stories/2025/01/a.jpg");

        storage.delete("stories/2025/01/a.jpg").await.unwrap();
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_local_storage_save_and_delete() {
        let base = std::env::temp_dir().join(format!("givehub-{}", ulid::Ulid::new()));
        let storage = LocalStorage::new(base.clone(), "https://give.example/storage/".to_string());

        storage.save("stories/2025/01/b.png", b"png").await.unwrap();
        assert!(storage.exists("stories/2025/01/b.png").await.unwrap());
        assert_eq!(
            std::fs::read(base.join("stories/2025/01/b.png")).unwrap(),
            b"png"
        );
        assert_eq!(
            storage.get_url("stories/2025/01/b.png"),
            "https://give.example/storage/stories/2025/01/b.png"
        );

        storage.delete("stories/2025/01/b.png").await.unwrap();
        assert!(!storage.exists("stories/2025/01/b.png").await.unwrap());
        // Deleting twice is fine.
        storage.delete("stories/2025/01/b.png").await.unwrap();

        std::fs::remove_dir_all(base).ok();
    }

    #[tokio::test]
    async fn test_local_storage_rejects_escaping_keys() {
        let storage = LocalStorage::new(std::env::temp_dir(), "/storage".to_string());
        assert!(matches!(
            storage.save("../etc/passwd", b"x").await,
            Err(AppError::Storage(_))
        ));
        assert!(storage.exists("/abs/path").await.is_err());
    }
}
