//! Uniform asynchronous key-value storage.
//!
//! The engine talks to one promise-style [`Storage`] trait regardless of how
//! the underlying store is shaped. Future-style stores ([`FileStorage`],
//! [`MemoryStorage`]) implement the trait directly; completion-callback
//! stores with a side-channel "last error" flag are bridged once, at
//! construction, by [`CallbackAdapter`] rather than shape-checked at every
//! call site.
//!
//! Failures surface as `storage`-category [`EngineError`]s marked
//! recoverable; retry policy belongs to the caller, never to the adapter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Promise-style key-value storage consumed by the engine.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a recoverable `storage` error if the underlying store fails.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a recoverable `storage` error if the underlying store fails.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove every stored key.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory [`Storage`] used by tests and mocks.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// [`Storage`] persisting all keys as one JSON object in a single file.
///
/// Writes go through a temp file and an atomic rename so a crash mid-write
/// never leaves a half-written store behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(EngineError::storage("failed to read store file")
                    .with_details(err.to_string()));
            }
        };
        serde_json::from_str(&content).map_err(|err| {
            EngineError::storage("store file is not valid JSON").with_details(err.to_string())
        })
    }

    async fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                EngineError::storage("failed to create store directory")
                    .with_details(err.to_string())
            })?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|err| EngineError::storage("failed to encode store").with_details(err.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await.map_err(|err| {
            EngineError::storage("failed to write store file").with_details(err.to_string())
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|err| {
            EngineError::storage("failed to replace store file").with_details(err.to_string())
        })?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await?;
        debug!(key, path = %self.path.display(), "stored value");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(EngineError::storage("failed to clear store").with_details(err.to_string()))
            }
        }
    }
}

// ============================================================================
// Callback-style store adapter
// ============================================================================

/// A key-value store with a completion-callback calling convention.
///
/// Failures are not reported through the callback; implementations record
/// them in a side-channel readable via [`CallbackStore::last_error`]
/// immediately after the callback fires.
pub trait CallbackStore: Send + Sync {
    /// Read `key`, invoking `done` with the value (or `None`) on completion.
    fn get(&self, key: &str, done: Box<dyn FnOnce(Option<Value>) + Send>);

    /// Store `value` under `key`, invoking `done` on completion.
    fn set(&self, key: &str, value: Value, done: Box<dyn FnOnce() + Send>);

    /// Remove every key, invoking `done` on completion.
    fn clear(&self, done: Box<dyn FnOnce() + Send>);

    /// The error recorded by the most recent operation, if any.
    fn last_error(&self) -> Option<String>;
}

/// Bridges a [`CallbackStore`] to the promise-style [`Storage`] trait.
///
/// Constructing the adapter is the one place where the calling-convention
/// decision is made; everything downstream sees only [`Storage`].
pub struct CallbackAdapter<S> {
    inner: S,
}

impl<S: CallbackStore> CallbackAdapter<S> {
    /// Wrap a callback-style store.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    fn check_last_error(&self, operation: &str) -> Result<()> {
        match self.inner.last_error() {
            Some(detail) => Err(EngineError::storage(format!("{operation} failed"))
                .with_details(detail)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: CallbackStore> Storage for CallbackAdapter<S> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let (tx, rx) = oneshot::channel();
        self.inner.get(
            key,
            Box::new(move |value| {
                let _ = tx.send(value);
            }),
        );
        let value = rx
            .await
            .map_err(|_| EngineError::storage("store dropped its completion callback"))?;
        self.check_last_error("get")?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.set(
            key,
            value,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        rx.await
            .map_err(|_| EngineError::storage("store dropped its completion callback"))?;
        self.check_last_error("set")
    }

    async fn clear(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.clear(Box::new(move || {
            let _ = tx.send(());
        }));
        rx.await
            .map_err(|_| EngineError::storage("store dropped its completion callback"))?;
        self.check_last_error("clear")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set("a", json!({"x": 1})).await.expect("set");
        assert_eq!(storage.get("a").await.expect("get"), Some(json!({"x": 1})));
        assert_eq!(storage.get("missing").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_memory_storage_clear() {
        let storage = MemoryStorage::new();
        storage.set("a", json!(1)).await.expect("set");
        storage.clear().await.expect("clear");
        assert_eq!(storage.get("a").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_file_storage_roundtrip() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("store.json"));

        storage.set("options", json!({"theme": "dark"})).await.expect("set");
        storage.set("state", json!({"k": true})).await.expect("set");

        assert_eq!(
            storage.get("options").await.expect("get"),
            Some(json!({"theme": "dark"}))
        );
        assert_eq!(storage.get("state").await.expect("get"), Some(json!({"k": true})));
    }

    #[tokio::test]
    async fn test_file_storage_missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nope.json"));
        assert_eq!(storage.get("anything").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_file_storage_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("deep/nested/store.json"));
        storage.set("a", json!(1)).await.expect("set");
        assert!(storage.path().exists());
    }

    #[tokio::test]
    async fn test_file_storage_clear_removes_file() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("store.json"));
        storage.set("a", json!(1)).await.expect("set");
        storage.clear().await.expect("clear");
        assert!(!storage.path().exists());
        // Clearing an already-empty store is fine.
        storage.clear().await.expect("clear again");
    }

    #[tokio::test]
    async fn test_file_storage_corrupted_file_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        std::fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        let err = storage.get("a").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.is_recoverable());
    }

    /// Callback-convention store used to exercise the adapter.
    #[derive(Default)]
    struct TestCallbackStore {
        entries: StdMutex<BTreeMap<String, Value>>,
        fail_next: StdMutex<Option<String>>,
        last_error: StdMutex<Option<String>>,
    }

    impl TestCallbackStore {
        fn fail_next(&self, message: &str) {
            *self.fail_next.lock().unwrap() = Some(message.to_string());
        }

        fn take_failure(&self) -> Option<String> {
            self.fail_next.lock().unwrap().take()
        }
    }

    impl CallbackStore for TestCallbackStore {
        fn get(&self, key: &str, done: Box<dyn FnOnce(Option<Value>) + Send>) {
            *self.last_error.lock().unwrap() = self.take_failure();
            let value = self.entries.lock().unwrap().get(key).cloned();
            done(value);
        }

        fn set(&self, key: &str, value: Value, done: Box<dyn FnOnce() + Send>) {
            let failure = self.take_failure();
            if failure.is_none() {
                self.entries.lock().unwrap().insert(key.to_string(), value);
            }
            *self.last_error.lock().unwrap() = failure;
            done();
        }

        fn clear(&self, done: Box<dyn FnOnce() + Send>) {
            *self.last_error.lock().unwrap() = self.take_failure();
            self.entries.lock().unwrap().clear();
            done();
        }

        fn last_error(&self) -> Option<String> {
            self.last_error.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_callback_adapter_roundtrip() {
        let storage = CallbackAdapter::new(TestCallbackStore::default());
        storage.set("k", json!([1, 2])).await.expect("set");
        assert_eq!(storage.get("k").await.expect("get"), Some(json!([1, 2])));
        storage.clear().await.expect("clear");
        assert_eq!(storage.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_callback_adapter_surfaces_last_error() {
        let inner = TestCallbackStore::default();
        inner.fail_next("quota exceeded");
        let storage = CallbackAdapter::new(inner);

        let err = storage.set("k", json!(1)).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.details(), Some("quota exceeded"));
        assert!(err.is_recoverable());

        // The flag is per-operation; the next call succeeds.
        storage.set("k", json!(2)).await.expect("set");
        assert_eq!(storage.get("k").await.expect("get"), Some(json!(2)));
    }
}
