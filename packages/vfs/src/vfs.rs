//! The filesystem operations over a record store.

use tracing::debug;
use workbench_store::{
    FileRecord, KeyRange, Payload, RecordStore, StoreError, WorkspaceSetting,
};

use crate::error::MoveRejection;
use crate::name::{ancestors, validate_path};
use crate::{mime, workspace, Namespace, Result, VfsConfig, VfsError};

/// A file or folder, addressed relative to the active workspace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    pub path: String,
    /// `None` marks a folder placeholder.
    pub file: Option<Payload>,
    pub dist_file: Option<Payload>,
}

impl Entry {
    pub fn file(path: impl Into<String>, payload: Payload) -> Self {
        Self {
            path: path.into(),
            file: Some(payload),
            dist_file: None,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_dist_file(mut self, dist_file: Payload) -> Self {
        self.dist_file = Some(dist_file);
        self
    }

    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_folder(&self) -> bool {
        self.file.is_none()
    }

    /// The last path segment.
    pub fn name(&self) -> &str {
        crate::name::file_name(&self.path)
    }
}

/// Result of [`Vfs::list_all`]: every record in the workspace, split by kind,
/// each half in key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub folders: Vec<Entry>,
    pub files: Vec<Entry>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// A hierarchical view of one workspace inside a [`RecordStore`].
///
/// Folders are either explicit placeholder records or implied by the paths
/// of their descendants. An implied folder disappears with its last child.
///
/// The store may be shared with other contexts (a resolver, another
/// editor). Each method is one store transaction at most, with the
/// exception of [`rename`](Self::rename) and [`add`](Self::add), whose checks
/// and writes are separate calls.
pub struct Vfs<S> {
    store: S,
    namespace: Namespace,
}

impl<S: RecordStore> Vfs<S> {
    pub fn new(store: S, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    /// Create the default workspaces on first run and select the configured
    /// one.
    pub fn open(store: S, config: &VfsConfig) -> Result<Self> {
        let namespace = Namespace::new(config.workspace.clone())?;
        workspace::ensure_workspaces(&store, config.workspace_count)?;
        Ok(Self::new(store, namespace))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn workspace(&self) -> &str {
        self.namespace.workspace()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Point this view at another workspace.
    ///
    /// Any cache derived from the old workspace, such as a
    /// [`FileTree`](crate::FileTree), must be rebuilt afterwards.
    pub fn switch_workspace(&mut self, name: impl Into<String>) -> Result<()> {
        self.namespace.switch_workspace(name)?;
        debug!(workspace = %self.namespace.workspace(), "switched workspace");
        Ok(())
    }

    /// Every record in the workspace, folders and files apart, key order.
    pub fn list_all(&self) -> Result<Listing> {
        let (folders, files): (Vec<Entry>, Vec<Entry>) = self
            .all_entries()?
            .into_iter()
            .partition(|entry| entry.is_folder());
        Ok(Listing { folders, files })
    }

    /// Every record in the workspace in key order, files and folders mixed.
    pub fn all_entries(&self) -> Result<Vec<Entry>> {
        let records = self
            .store
            .scan(&KeyRange::prefix(self.namespace.prefix()))?;
        Ok(records
            .into_iter()
            .filter_map(|record| self.to_entry(record))
            .collect())
    }

    /// Insert entries one at a time.
    ///
    /// Stops at the first failure. Entries inserted before it stay. A file
    /// payload without a type gets one inferred from its extension.
    ///
    /// # Errors
    ///
    /// * `Collision` - the path is taken, either by a record or by an
    ///   implied folder when adding a file.
    /// * `InvalidPath` - a bad segment, or an ancestor is a file.
    pub fn add(&self, entries: impl IntoIterator<Item = Entry>) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for entry in entries {
            validate_path(&entry.path)?;
            self.check_ancestors(&entry.path)?;
            if entry.is_file() && self.has_descendants(&entry.path)? {
                return Err(VfsError::Collision { path: entry.path });
            }

            let file = entry.file.map(|payload| {
                if payload.mime_type.is_some() {
                    payload
                } else {
                    let inferred = mime::infer(&entry.path);
                    payload.with_type(inferred)
                }
            });
            let record = FileRecord {
                path: self.namespace.resolve(&entry.path),
                file,
                dist_file: entry.dist_file,
                ..Default::default()
            };
            self.store
                .insert(record)
                .map_err(|e| VfsError::from_store(&entry.path, e))?;
            debug!(path = %entry.path, "added");
            added.push(entry.path);
        }
        Ok(added)
    }

    /// Delete `path` and everything under `path/`.
    ///
    /// Returns the deleted paths so callers can close whatever they had open
    /// on them. A missing path deletes nothing.
    pub fn remove(&self, path: &str) -> Result<Vec<String>> {
        let keys = self
            .store
            .delete(&KeyRange::subtree(self.namespace.resolve(path)))?;
        debug!(%path, count = keys.len(), "removed");
        Ok(self.strip_all(keys))
    }

    /// Delete every record in the workspace. The workspace root record and
    /// its settings stay.
    pub fn remove_all(&self) -> Result<Vec<String>> {
        let keys = self
            .store
            .delete(&KeyRange::prefix(self.namespace.prefix()))?;
        debug!(workspace = %self.namespace.workspace(), count = keys.len(), "removed all");
        Ok(self.strip_all(keys))
    }

    /// Move `old` and everything under it to `new`, keeping relative
    /// suffixes.
    ///
    /// A file whose inferred type changes gets its payload re-typed and its
    /// derived payload dropped. Returns `(old, new)` pairs in old-key order.
    ///
    /// The caller is expected to have run [`check_move`](Self::check_move);
    /// only store-level uniqueness is enforced here.
    pub fn move_path(&self, old: &str, new: &str) -> Result<Vec<(String, String)>> {
        let old_key = self.namespace.resolve(old);
        let new_key = self.namespace.resolve(new);

        let pairs = self
            .store
            .rewrite(&KeyRange::subtree(old_key.as_str()), &mut |mut record| {
                let moved = format!("{}{}", new_key, &record.path[old_key.len()..]);
                let new_type = mime::infer(&moved);
                if mime::infer(&record.path) != new_type {
                    if let Some(file) = record.file.take() {
                        record.file = Some(file.with_type(new_type));
                        record.dist_file = None;
                    }
                }
                record.with_path(moved)
            })
            .map_err(|e| self.translate(e))?;

        debug!(%old, %new, count = pairs.len(), "moved");
        Ok(pairs
            .into_iter()
            .filter_map(|(from, to)| {
                let from = self.namespace.strip(&from)?.to_string();
                let to = self.namespace.strip(&to)?.to_string();
                Some((from, to))
            })
            .collect())
    }

    /// Check that moving `old` to `new` is allowed.
    pub fn check_move(&self, old: &str, new: &str) -> Result<()> {
        validate_path(new)?;
        if old == new {
            return Err(VfsError::invalid_move(old, new, MoveRejection::SamePath));
        }
        if format!("{}/", new).starts_with(&format!("{}/", old)) {
            return Err(VfsError::invalid_move(old, new, MoveRejection::IntoDescendant));
        }
        if self.scan_subtree(old)?.is_empty() {
            return Err(VfsError::invalid_move(old, new, MoveRejection::NotFound));
        }
        if !self.scan_subtree(new)?.is_empty() {
            return Err(VfsError::invalid_move(
                old,
                new,
                MoveRejection::DestinationOccupied,
            ));
        }
        self.check_ancestors(new)
    }

    /// [`check_move`](Self::check_move) followed by
    /// [`move_path`](Self::move_path).
    ///
    /// Another context writing to `new` between the two steps still gets a
    /// `Collision` from the store.
    pub fn rename(&self, old: &str, new: &str) -> Result<Vec<(String, String)>> {
        self.check_move(old, new)?;
        self.move_path(old, new)
    }

    /// The payload at `path`: the derived one if `prefer_derived` and present,
    /// otherwise the source. `None` for missing paths and folders.
    pub fn get(&self, path: &str, prefer_derived: bool) -> Result<Option<Payload>> {
        let record = self.store.get(&self.namespace.resolve(path))?;
        Ok(record.and_then(|record| record.served_payload(prefer_derived).cloned()))
    }

    /// The record at `path`, if any.
    pub fn lookup(&self, path: &str) -> Result<Option<Entry>> {
        let record = self.store.get(&self.namespace.resolve(path))?;
        Ok(record.and_then(|record| self.to_entry(record)))
    }

    /// Overwrite the payload and derived payload of an existing file.
    ///
    /// Passing `None` for `derived` clears it. A payload without a type gets
    /// one inferred from the path.
    pub fn put(&self, path: &str, payload: Payload, derived: Option<Payload>) -> Result<()> {
        let key = self.namespace.resolve(path);
        let mut record = self.store.get(&key)?.ok_or_else(|| VfsError::NotFound {
            path: path.to_string(),
        })?;
        if record.is_folder() {
            return Err(VfsError::IsFolder {
                path: path.to_string(),
            });
        }

        let payload = match payload.mime_type {
            Some(_) => payload,
            None => payload.with_type(mime::infer(path)),
        };
        record.file = Some(payload);
        record.dist_file = derived;
        if !self.store.update(record)? {
            // removed by someone else since the read
            return Err(VfsError::NotFound {
                path: path.to_string(),
            });
        }
        debug!(%path, "saved");
        Ok(())
    }

    /// Settings of the active workspace, with defaults filled in.
    pub fn setting(&self) -> Result<WorkspaceSetting> {
        Ok(self.root_record()?.setting_or_default())
    }

    pub fn put_setting(&self, setting: WorkspaceSetting) -> Result<()> {
        let mut root = self.root_record()?;
        root.setting = Some(setting);
        if !self.store.update(root)? {
            return Err(self.root_missing());
        }
        Ok(())
    }

    fn root_record(&self) -> Result<FileRecord> {
        self.store
            .get(self.namespace.root_key())?
            .ok_or_else(|| self.root_missing())
    }

    fn root_missing(&self) -> VfsError {
        VfsError::NotFound {
            path: self.namespace.root_key().to_string(),
        }
    }

    fn to_entry(&self, record: FileRecord) -> Option<Entry> {
        let path = self.namespace.strip(&record.path)?.to_string();
        Some(Entry {
            path,
            file: record.file,
            dist_file: record.dist_file,
        })
    }

    fn strip_all(&self, keys: Vec<String>) -> Vec<String> {
        keys.iter()
            .filter_map(|key| self.namespace.strip(key))
            .map(str::to_string)
            .collect()
    }

    fn scan_subtree(&self, path: &str) -> Result<Vec<FileRecord>> {
        Ok(self
            .store
            .scan(&KeyRange::subtree(self.namespace.resolve(path)))?)
    }

    fn has_descendants(&self, path: &str) -> Result<bool> {
        let under = format!("{}/", self.namespace.resolve(path));
        Ok(!self.store.scan(&KeyRange::prefix(under))?.is_empty())
    }

    /// Reject paths that would nest under a file.
    fn check_ancestors(&self, path: &str) -> Result<()> {
        for ancestor in ancestors(path) {
            let record = self.store.get(&self.namespace.resolve(ancestor))?;
            if record.is_some_and(|record| record.is_file()) {
                return Err(VfsError::InvalidPath {
                    path: path.to_string(),
                    message: format!("'{}' is a file", ancestor),
                });
            }
        }
        Ok(())
    }

    fn translate(&self, err: StoreError) -> VfsError {
        match err {
            StoreError::Conflict { key } => VfsError::Collision {
                path: self
                    .namespace
                    .strip(&key)
                    .map(str::to_string)
                    .unwrap_or(key),
            },
            other => VfsError::Store(other),
        }
    }
}
