//! The store trait.

use std::sync::Arc;

use crate::{FileRecord, KeyRange, Result};

/// Rewrites one record during [`RecordStore::rewrite`].
pub type Rewrite<'a> = dyn FnMut(FileRecord) -> FileRecord + 'a;

/// A transactional table of [`FileRecord`]s keyed by unique path strings.
///
/// Every method is one transaction: it either applies completely or not at
/// all. Nothing spans two calls, so a reader running between two calls of a
/// writer can observe the state after the first.
///
/// Methods take `&self` so that several contexts (for example an editor and
/// a resolver) can each hold a handle to the same table.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn RecordStore>`.
pub trait RecordStore: Send + Sync {
    /// Point lookup.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No record has this key.
    /// * `Ok(Some(record))` - The record.
    /// * `Err(StoreError)` - The backend failed.
    fn get(&self, key: &str) -> Result<Option<FileRecord>>;

    /// Insert a new record.
    ///
    /// Fails with `StoreError::Conflict` if the key is taken; the existing
    /// record is left untouched.
    fn insert(&self, record: FileRecord) -> Result<()>;

    /// Replace an existing record with the same key.
    ///
    /// Returns `false` without writing anything when no record has the key.
    fn update(&self, record: FileRecord) -> Result<bool>;

    /// All records in range, in ascending key order.
    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>>;

    /// Delete every record in range. Returns the deleted keys in key order.
    fn delete(&self, range: &KeyRange) -> Result<Vec<String>>;

    /// Pass every record in range through `f` and store the results.
    ///
    /// `f` may change the key. Returns `(old_key, new_key)` pairs in the
    /// original key order. If a new key collides with a record outside the
    /// range, or two new keys coincide, nothing is written and
    /// `StoreError::Conflict` names the contested key.
    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>>;
}

// Blanket implementations for references and smart pointers

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn get(&self, key: &str) -> Result<Option<FileRecord>> {
        (**self).get(key)
    }

    fn insert(&self, record: FileRecord) -> Result<()> {
        (**self).insert(record)
    }

    fn update(&self, record: FileRecord) -> Result<bool> {
        (**self).update(record)
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        (**self).scan(range)
    }

    fn delete(&self, range: &KeyRange) -> Result<Vec<String>> {
        (**self).delete(range)
    }

    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>> {
        (**self).rewrite(range, f)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<FileRecord>> {
        self.as_ref().get(key)
    }

    fn insert(&self, record: FileRecord) -> Result<()> {
        self.as_ref().insert(record)
    }

    fn update(&self, record: FileRecord) -> Result<bool> {
        self.as_ref().update(record)
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        self.as_ref().scan(range)
    }

    fn delete(&self, range: &KeyRange) -> Result<Vec<String>> {
        self.as_ref().delete(range)
    }

    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>> {
        self.as_ref().rewrite(range, f)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<FileRecord>> {
        self.as_ref().get(key)
    }

    fn insert(&self, record: FileRecord) -> Result<()> {
        self.as_ref().insert(record)
    }

    fn update(&self, record: FileRecord) -> Result<bool> {
        self.as_ref().update(record)
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        self.as_ref().scan(range)
    }

    fn delete(&self, range: &KeyRange) -> Result<Vec<String>> {
        self.as_ref().delete(range)
    }

    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>> {
        self.as_ref().rewrite(range, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Payload};

    #[test]
    fn object_safety_works() {
        let store = MemoryStore::new();
        let boxed: Box<dyn RecordStore> = Box::new(store.clone());

        boxed
            .insert(FileRecord::file("ws/a.txt", Payload::new("a", None)))
            .unwrap();

        assert!(store.get("ws/a.txt").unwrap().is_some());
        assert_eq!(boxed.scan(&KeyRange::All).unwrap().len(), 1);
    }

    #[test]
    fn shared_handles_see_each_other() {
        let store = Arc::new(MemoryStore::new());
        let editor = Arc::clone(&store);
        let server = &store;

        editor.insert(FileRecord::folder("ws/src")).unwrap();
        assert!(server.get("ws/src").unwrap().is_some());
    }
}
