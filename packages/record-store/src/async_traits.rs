//! Async version of [`RecordStore`](crate::RecordStore).
//!
//! Behind the `async` feature, which is on by default:
//!
//! ```toml
//! [dependencies]
//! workbench-store = { version = "0.1", default-features = false }
//! ```
//!
//! drops it along with `async-trait`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{FileRecord, KeyRange, RecordStore, Result};

/// Rewrites one record during [`AsyncRecordStore::rewrite_async`].
pub type AsyncRewrite<'a> = dyn FnMut(FileRecord) -> FileRecord + Send + 'a;

/// Async version of `RecordStore`.
///
/// Same transaction rules: each call applies completely or not at all.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn AsyncRecordStore>`.
#[async_trait]
pub trait AsyncRecordStore: Send + Sync {
    async fn get_async(&self, key: &str) -> Result<Option<FileRecord>>;

    async fn insert_async(&self, record: FileRecord) -> Result<()>;

    async fn update_async(&self, record: FileRecord) -> Result<bool>;

    async fn scan_async(&self, range: &KeyRange) -> Result<Vec<FileRecord>>;

    async fn delete_async(&self, range: &KeyRange) -> Result<Vec<String>>;

    async fn rewrite_async(
        &self,
        range: &KeyRange,
        f: &mut AsyncRewrite<'_>,
    ) -> Result<Vec<(String, String)>>;
}

#[async_trait]
impl<T: AsyncRecordStore + ?Sized> AsyncRecordStore for Box<T> {
    async fn get_async(&self, key: &str) -> Result<Option<FileRecord>> {
        self.as_ref().get_async(key).await
    }

    async fn insert_async(&self, record: FileRecord) -> Result<()> {
        self.as_ref().insert_async(record).await
    }

    async fn update_async(&self, record: FileRecord) -> Result<bool> {
        self.as_ref().update_async(record).await
    }

    async fn scan_async(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        self.as_ref().scan_async(range).await
    }

    async fn delete_async(&self, range: &KeyRange) -> Result<Vec<String>> {
        self.as_ref().delete_async(range).await
    }

    async fn rewrite_async(
        &self,
        range: &KeyRange,
        f: &mut AsyncRewrite<'_>,
    ) -> Result<Vec<(String, String)>> {
        self.as_ref().rewrite_async(range, f).await
    }
}

/// Adapter to use a sync store from async code.
///
/// Calls run inline on the calling task. The backends hold their own locks,
/// so no extra mutex is needed here. For long scans on a busy runtime,
/// move the work to `spawn_blocking` yourself.
///
/// # Example
///
/// ```rust,ignore
/// use workbench_store::{AsyncRecordStore, MemoryStore, SyncToAsync};
///
/// let store = SyncToAsync::new(MemoryStore::new());
/// let record = store.get_async("workspace1/index.html").await?;
/// ```
pub struct SyncToAsync<T> {
    inner: Arc<T>,
}

impl<T> SyncToAsync<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wrap a store that is already shared.
    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> Clone for SyncToAsync<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<T: RecordStore + 'static> AsyncRecordStore for SyncToAsync<T> {
    async fn get_async(&self, key: &str) -> Result<Option<FileRecord>> {
        self.inner.get(key)
    }

    async fn insert_async(&self, record: FileRecord) -> Result<()> {
        self.inner.insert(record)
    }

    async fn update_async(&self, record: FileRecord) -> Result<bool> {
        self.inner.update(record)
    }

    async fn scan_async(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        self.inner.scan(range)
    }

    async fn delete_async(&self, range: &KeyRange) -> Result<Vec<String>> {
        self.inner.delete(range)
    }

    async fn rewrite_async(
        &self,
        range: &KeyRange,
        f: &mut AsyncRewrite<'_>,
    ) -> Result<Vec<(String, String)>> {
        self.inner.rewrite(range, &mut |record| f(record))
    }
}
