//! In-memory backend.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::range::Span;
use crate::{FileRecord, KeyRange, RecordStore, Result, Rewrite, StoreError};

type Table = BTreeMap<String, FileRecord>;

/// A record table held in a `BTreeMap`.
///
/// Cloning a `MemoryStore` gives another handle to the same table, which is
/// how two independent contexts share one store inside a process. Each
/// operation holds the table lock for its whole duration, which makes it a
/// transaction.
///
/// # Example
///
/// ```rust
/// use workbench_store::{FileRecord, MemoryStore, Payload, RecordStore};
///
/// let editor = MemoryStore::new();
/// let server = editor.clone();
///
/// editor.insert(FileRecord::file("ws/index.html", Payload::new("<h1>hi</h1>", None))).unwrap();
/// assert!(server.get("ws/index.html").unwrap().is_some());
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`. Later duplicates replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let table = records
            .into_iter()
            .map(|record| (record.path.clone(), record))
            .collect();
        Self {
            table: Arc::new(Mutex::new(table)),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>> {
        self.table.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Keys in range, ascending.
    fn keys_in(table: &Table, range: &KeyRange) -> Vec<String> {
        let mut keys = Vec::new();
        for span in range.spans() {
            match span {
                Span::Key(k) => {
                    if table.contains_key(k) {
                        keys.push(k.to_string());
                    }
                }
                Span::Prefix(p) => {
                    let p: &str = &p;
                    keys.extend(
                        table
                            .range::<str, _>((Bound::Included(p), Bound::Unbounded))
                            .map(|(k, _)| k)
                            .take_while(|k| k.starts_with(p))
                            .cloned(),
                    );
                }
                Span::TopLevel => {
                    keys.extend(table.keys().filter(|k| range.contains(k)).cloned());
                }
            }
        }
        keys
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<FileRecord>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn insert(&self, record: FileRecord) -> Result<()> {
        let mut table = self.lock()?;
        if table.contains_key(&record.path) {
            return Err(StoreError::Conflict { key: record.path });
        }
        debug!(key = %record.path, "insert");
        table.insert(record.path.clone(), record);
        Ok(())
    }

    fn update(&self, record: FileRecord) -> Result<bool> {
        let mut table = self.lock()?;
        match table.get_mut(&record.path) {
            Some(slot) => {
                debug!(key = %record.path, "update");
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        let table = self.lock()?;
        let records = Self::keys_in(&table, range)
            .into_iter()
            .filter_map(|k| table.get(&k).cloned())
            .collect();
        Ok(records)
    }

    fn delete(&self, range: &KeyRange) -> Result<Vec<String>> {
        let mut table = self.lock()?;
        let keys = Self::keys_in(&table, range);
        for key in &keys {
            table.remove(key);
        }
        debug!(%range, count = keys.len(), "delete");
        Ok(keys)
    }

    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>> {
        let mut table = self.lock()?;
        let old_keys = Self::keys_in(&table, range);
        let old_set: HashSet<&str> = old_keys.iter().map(String::as_str).collect();

        let mut rewritten = Vec::with_capacity(old_keys.len());
        let mut new_set = HashSet::with_capacity(old_keys.len());
        for key in &old_keys {
            let Some(record) = table.get(key).cloned() else {
                continue;
            };
            let record = f(record);
            let occupied_outside = table.contains_key(&record.path) && !old_set.contains(record.path.as_str());
            if occupied_outside || !new_set.insert(record.path.clone()) {
                return Err(StoreError::Conflict { key: record.path });
            }
            rewritten.push((key.clone(), record));
        }

        for key in &old_keys {
            table.remove(key);
        }
        let mut pairs = Vec::with_capacity(rewritten.len());
        for (old_key, record) in rewritten {
            pairs.push((old_key, record.path.clone()));
            table.insert(record.path.clone(), record);
        }
        debug!(%range, count = pairs.len(), "rewrite");
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;

    fn file(path: &str) -> FileRecord {
        FileRecord::file(path, Payload::new(path.to_string(), None))
    }

    fn keys(records: Vec<FileRecord>) -> Vec<String> {
        records.into_iter().map(|r| r.path).collect()
    }

    fn sample() -> MemoryStore {
        MemoryStore::with_records([
            FileRecord::folder("ws"),
            FileRecord::folder("ws/foo"),
            file("ws/foo/a.js"),
            file("ws/foo/b/c.js"),
            file("ws/foo-old.js"),
            file("ws/foo.txt"),
            file("ws/foobar"),
            file("ws2/foo/a.js"),
        ])
    }

    #[test]
    fn insert_rejects_existing_key() {
        let store = MemoryStore::new();
        store.insert(file("ws/a.txt")).unwrap();

        let err = store
            .insert(FileRecord::file("ws/a.txt", Payload::new("other", None)))
            .unwrap_err();
        assert!(err.is_conflict());

        let kept = store.get("ws/a.txt").unwrap().unwrap();
        assert_eq!(kept.file.unwrap().bytes, "ws/a.txt".as_bytes());
    }

    #[test]
    fn update_requires_existing_key() {
        let store = MemoryStore::new();
        assert!(!store.update(file("ws/missing")).unwrap());
        assert!(store.is_empty().unwrap());

        store.insert(file("ws/a")).unwrap();
        let replacement = FileRecord::file("ws/a", Payload::new("new", None));
        assert!(store.update(replacement.clone()).unwrap());
        assert_eq!(store.get("ws/a").unwrap(), Some(replacement));
    }

    #[test]
    fn subtree_scan_skips_lexical_siblings() {
        let store = sample();
        let found = keys(store.scan(&KeyRange::subtree("ws/foo")).unwrap());
        assert_eq!(found, ["ws/foo", "ws/foo/a.js", "ws/foo/b/c.js"]);
    }

    #[test]
    fn prefix_scan_is_key_ordered() {
        let store = sample();
        let found = keys(store.scan(&KeyRange::prefix("ws/")).unwrap());
        assert_eq!(
            found,
            [
                "ws/foo",
                "ws/foo-old.js",
                "ws/foo.txt",
                "ws/foo/a.js",
                "ws/foo/b/c.js",
                "ws/foobar"
            ]
        );
    }

    #[test]
    fn delete_subtree() {
        let store = sample();
        let removed = store.delete(&KeyRange::subtree("ws/foo")).unwrap();
        assert_eq!(removed, ["ws/foo", "ws/foo/a.js", "ws/foo/b/c.js"]);
        assert!(store.get("ws/foobar").unwrap().is_some());
        assert!(store.get("ws/foo-old.js").unwrap().is_some());
        assert!(store.get("ws2/foo/a.js").unwrap().is_some());
    }

    #[test]
    fn rewrite_moves_keys() {
        let store = sample();
        let pairs = store
            .rewrite(&KeyRange::subtree("ws/foo"), &mut |record| {
                let path = record.path.replacen("ws/foo", "ws/bar", 1);
                record.with_path(path)
            })
            .unwrap();

        assert_eq!(
            pairs,
            [
                ("ws/foo".to_string(), "ws/bar".to_string()),
                ("ws/foo/a.js".to_string(), "ws/bar/a.js".to_string()),
                ("ws/foo/b/c.js".to_string(), "ws/bar/b/c.js".to_string()),
            ]
        );
        assert!(store.scan(&KeyRange::subtree("ws/foo")).unwrap().is_empty());
        assert_eq!(store.scan(&KeyRange::subtree("ws/bar")).unwrap().len(), 3);
    }

    #[test]
    fn rewrite_conflict_changes_nothing() {
        let store = sample();
        let before = store.scan(&KeyRange::All).unwrap();

        let err = store
            .rewrite(&KeyRange::subtree("ws/foo"), &mut |record| {
                let path = record.path.replacen("ws/foo", "ws2/foo", 1);
                record.with_path(path)
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { ref key } if key == "ws2/foo/a.js"));
        assert_eq!(store.scan(&KeyRange::All).unwrap(), before);
    }

    #[test]
    fn rewrite_within_own_range_is_allowed() {
        let store = MemoryStore::with_records([file("ws/a/b"), file("ws/a/c")]);
        // b -> c and c -> b swap inside the range without touching outsiders
        let pairs = store
            .rewrite(&KeyRange::subtree("ws/a"), &mut |record| {
                let path = if record.path.ends_with('b') {
                    "ws/a/c".to_string()
                } else {
                    "ws/a/b".to_string()
                };
                record.with_path(path)
            })
            .unwrap();
        assert_eq!(pairs.len(), 2);
        let b = store.get("ws/a/b").unwrap().unwrap();
        assert_eq!(b.file.unwrap().bytes, "ws/a/c".as_bytes());
    }

    #[test]
    fn rewrite_rejects_coinciding_keys() {
        let store = MemoryStore::with_records([file("ws/a/b"), file("ws/a/c")]);
        let err = store
            .rewrite(&KeyRange::subtree("ws/a"), &mut |record| record.with_path("ws/z"))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len().unwrap(), 2);
    }
}
