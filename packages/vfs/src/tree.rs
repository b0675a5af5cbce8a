//! In-memory tree view of a workspace.
//!
//! The tree is a cache built from [`Vfs::list_all`](crate::Vfs::list_all).
//! It is never written back and goes stale as soon as the store changes or
//! the workspace is switched; rebuild it then.

use std::collections::btree_map::{self, BTreeMap};

use tracing::warn;
use workbench_store::MimeType;

use crate::{Entry, Listing};

/// A node of a [`FileTree`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Folder(Folder),
    File(FileInfo),
}

impl Node {
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }
}

/// A folder and its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Folder {
    /// Backed by a placeholder record rather than implied by descendants.
    pub explicit: bool,
    children: BTreeMap<String, Node>,
}

impl Folder {
    /// Children in display order: folders, then files, each by name.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        let folders = self.children.iter().filter(|(_, node)| node.is_folder());
        let files = self.children.iter().filter(|(_, node)| node.is_file());
        folders.chain(files).map(|(name, node)| (name.as_str(), node))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// What the tree knows about a file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileInfo {
    pub mime_type: Option<MimeType>,
    pub len: usize,
    pub has_derived: bool,
}

/// One step of [`FileTree::walk`].
#[derive(Debug)]
pub struct TreeItem<'a> {
    pub path: String,
    pub name: &'a str,
    /// 0 for top-level entries.
    pub depth: usize,
    pub node: &'a Node,
}

/// Folders and files of one workspace as a tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileTree {
    root: Folder,
}

impl FileTree {
    pub fn from_listing(listing: &Listing) -> Self {
        Self::from_entries(listing.folders.iter().chain(listing.files.iter()))
    }

    /// Build from entries in any order. Entries that would put something
    /// under a file are skipped.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut tree = Self::default();
        for entry in entries {
            let node = match &entry.file {
                Some(payload) => Node::File(FileInfo {
                    mime_type: payload.mime_type.clone(),
                    len: payload.len(),
                    has_derived: entry.dist_file.is_some(),
                }),
                None => Node::Folder(Folder {
                    explicit: true,
                    ..Default::default()
                }),
            };
            if !tree.insert(&entry.path, node) {
                warn!(path = %entry.path, "skipping entry that conflicts with a file");
            }
        }
        tree
    }

    fn insert(&mut self, path: &str, node: Node) -> bool {
        let (parents, name) = match path.rsplit_once('/') {
            Some((parents, name)) => (Some(parents), name),
            None => (None, path),
        };

        let mut folder = &mut self.root;
        for segment in parents.into_iter().flat_map(|p| p.split('/')) {
            let child = folder
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Node::Folder(Folder::default()));
            folder = match child {
                Node::Folder(f) => f,
                Node::File(_) => return false,
            };
        }

        match folder.children.entry(name.to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
            btree_map::Entry::Occupied(mut slot) => match (slot.get_mut(), node) {
                (Node::Folder(existing), Node::Folder(_)) => {
                    existing.explicit = true;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut node = self.root.children.get(first)?;
        for segment in segments {
            node = match node {
                Node::Folder(folder) => folder.children.get(segment)?,
                Node::File(_) => return None,
            };
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.get(path).is_some_and(Node::is_folder)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.get(path).is_some_and(Node::is_file)
    }

    /// Depth-first, in display order.
    pub fn walk(&self) -> Vec<TreeItem<'_>> {
        let mut items = Vec::new();
        walk_folder(&self.root, "", 0, &mut items);
        items
    }
}

fn walk_folder<'a>(folder: &'a Folder, base: &str, depth: usize, items: &mut Vec<TreeItem<'a>>) {
    for (name, node) in folder.children() {
        let path = if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        };
        items.push(TreeItem {
            path: path.clone(),
            name,
            depth,
            node,
        });
        if let Node::Folder(child) = node {
            walk_folder(child, &path, depth + 1, items);
        }
    }
}
