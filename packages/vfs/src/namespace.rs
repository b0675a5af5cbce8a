//! Mapping between workspace-relative paths and global store keys.

use crate::{Result, VfsError};

/// The active workspace and the key prefix it implies.
///
/// A global key is `workspace + "/" + relative_path`. The workspace root
/// record itself is keyed by the bare workspace name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    workspace: String,
    prefix: String,
}

impl Namespace {
    pub fn new(workspace: impl Into<String>) -> Result<Self> {
        let workspace = workspace.into();
        validate_workspace(&workspace)?;
        let prefix = format!("{}/", workspace);
        Ok(Self { workspace, prefix })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// `workspace + "/"`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the workspace root record.
    pub fn root_key(&self) -> &str {
        &self.workspace
    }

    pub fn resolve(&self, relative: &str) -> String {
        format!("{}{}", self.prefix, relative)
    }

    /// Inverse of [`resolve`](Self::resolve). `None` for keys outside the
    /// active workspace, including the root record.
    pub fn strip<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.prefix.as_str())
    }

    /// Point at another workspace.
    ///
    /// Anything cached for the old workspace (tree views, open editors) is
    /// stale after this and must be dropped by the caller.
    pub fn switch_workspace(&mut self, name: impl Into<String>) -> Result<()> {
        *self = Self::new(name)?;
        Ok(())
    }
}

/// Workspace names are flat: non-empty and without `/`.
pub fn validate_workspace(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(VfsError::InvalidWorkspace {
            name: name.to_string(),
        });
    }
    Ok(())
}
