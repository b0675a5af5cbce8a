//! The workspace registry: the zero-depth root records.

use tracing::info;
use workbench_store::{FileRecord, KeyRange, RecordStore, StoreError, WorkspaceSetting};

use crate::Result;

/// Workspaces created on first run.
pub const DEFAULT_WORKSPACE_COUNT: usize = 4;

/// Workspace selected when none is configured.
pub const DEFAULT_WORKSPACE: &str = "workspace1";

/// How a [`Vfs`](crate::Vfs) is opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VfsConfig {
    /// The workspace to select.
    pub workspace: String,
    /// How many workspaces to create when the store has none.
    pub workspace_count: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            workspace: DEFAULT_WORKSPACE.to_string(),
            workspace_count: DEFAULT_WORKSPACE_COUNT,
        }
    }
}

impl VfsConfig {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Default::default()
        }
    }
}

/// A workspace root record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    pub label: String,
    pub setting: WorkspaceSetting,
}

impl Workspace {
    fn from_record(record: FileRecord) -> Self {
        let setting = record.setting_or_default();
        Self {
            label: record.label.unwrap_or_else(|| record.path.clone()),
            name: record.path,
            setting,
        }
    }
}

/// The name of the `n`th default workspace, counting from 1.
pub fn default_name(n: usize) -> String {
    format!("workspace{}", n)
}

/// Create root records `workspace1` through `workspace{count}`, labelled
/// `Workspace N`. Roots that already exist are left alone.
///
/// Returns the names that were created.
pub fn init_workspaces<S: RecordStore + ?Sized>(store: &S, count: usize) -> Result<Vec<String>> {
    let mut created = Vec::new();
    for n in 1..=count {
        let name = default_name(n);
        let record =
            FileRecord::workspace_root(name.clone(), format!("Workspace {}", n), WorkspaceSetting::default());
        match store.insert(record) {
            Ok(()) => created.push(name),
            Err(StoreError::Conflict { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
    if !created.is_empty() {
        info!(count = created.len(), "created workspaces");
    }
    Ok(created)
}

/// All workspace roots in key order, settings defaulted.
///
/// Reads only the zero-depth records, never the files under them.
pub fn list_workspaces<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Workspace>> {
    let records = store.scan(&KeyRange::TopLevel)?;
    Ok(records.into_iter().map(Workspace::from_record).collect())
}

/// Initialize `count` workspaces if the store has none. Returns whether it
/// did.
pub fn ensure_workspaces<S: RecordStore + ?Sized>(store: &S, count: usize) -> Result<bool> {
    if !list_workspaces(store)?.is_empty() {
        return Ok(false);
    }
    init_workspaces(store, count)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use workbench_store::{MemoryStore, Payload, Rewrite};

    /// Remembers every range it is asked to scan.
    #[derive(Default)]
    struct Recording {
        inner: MemoryStore,
        scans: Mutex<Vec<KeyRange>>,
    }

    impl RecordStore for Recording {
        fn get(&self, key: &str) -> workbench_store::Result<Option<FileRecord>> {
            self.inner.get(key)
        }

        fn insert(&self, record: FileRecord) -> workbench_store::Result<()> {
            self.inner.insert(record)
        }

        fn update(&self, record: FileRecord) -> workbench_store::Result<bool> {
            self.inner.update(record)
        }

        fn scan(&self, range: &KeyRange) -> workbench_store::Result<Vec<FileRecord>> {
            self.scans.lock().unwrap().push(range.clone());
            self.inner.scan(range)
        }

        fn delete(&self, range: &KeyRange) -> workbench_store::Result<Vec<String>> {
            self.inner.delete(range)
        }

        fn rewrite(
            &self,
            range: &KeyRange,
            f: &mut Rewrite<'_>,
        ) -> workbench_store::Result<Vec<(String, String)>> {
            self.inner.rewrite(range, f)
        }
    }

    #[test]
    fn init_creates_labelled_roots() {
        let store = MemoryStore::new();
        let created = init_workspaces(&store, 4).unwrap();
        assert_eq!(created, ["workspace1", "workspace2", "workspace3", "workspace4"]);

        let workspaces = list_workspaces(&store).unwrap();
        assert_eq!(workspaces.len(), 4);
        assert_eq!(workspaces[0].label, "Workspace 1");
        assert_eq!(workspaces[3].name, "workspace4");
        assert_eq!(workspaces[0].setting, WorkspaceSetting::default());
    }

    #[test]
    fn init_is_idempotent() {
        let store = MemoryStore::new();
        init_workspaces(&store, 2).unwrap();
        let created = init_workspaces(&store, 3).unwrap();
        assert_eq!(created, ["workspace3"]);
        assert_eq!(list_workspaces(&store).unwrap().len(), 3);
    }

    #[test]
    fn ensure_only_on_empty_registry() {
        let store = MemoryStore::new();
        assert!(ensure_workspaces(&store, 4).unwrap());
        assert!(!ensure_workspaces(&store, 4).unwrap());
        assert_eq!(list_workspaces(&store).unwrap().len(), 4);
    }

    #[test]
    fn list_skips_nested_records() {
        let store = MemoryStore::new();
        init_workspaces(&store, 1).unwrap();
        store
            .insert(FileRecord::file("workspace1/a.txt", Payload::new("a", None)))
            .unwrap();
        store.insert(FileRecord::folder("scratch")).unwrap();

        let names: Vec<String> = list_workspaces(&store)
            .unwrap()
            .into_iter()
            .map(|ws| ws.name)
            .collect();
        assert_eq!(names, ["scratch", "workspace1"]);
    }

    #[test]
    fn listing_reads_only_root_records() {
        let store = Recording::default();
        init_workspaces(&store, 2).unwrap();
        store
            .insert(FileRecord::file("workspace1/big.bin", Payload::new(vec![0u8; 4096], None)))
            .unwrap();

        assert!(!ensure_workspaces(&store, 4).unwrap());
        assert_eq!(list_workspaces(&store).unwrap().len(), 2);
        assert_eq!(
            *store.scans.lock().unwrap(),
            [KeyRange::TopLevel, KeyRange::TopLevel]
        );
    }
}
