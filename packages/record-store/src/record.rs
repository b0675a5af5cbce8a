//! The persisted record and its payloads.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::MimeType;

/// File contents plus the type they are served with.
#[derive(Clone, PartialEq)]
pub struct Payload {
    pub bytes: Bytes,
    pub mime_type: Option<MimeType>,
}

impl Payload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: Option<MimeType>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Same bytes, different type. The bytes are shared, not copied.
    #[must_use]
    pub fn with_type(self, mime_type: Option<MimeType>) -> Self {
        Self {
            bytes: self.bytes,
            mime_type,
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("bytes_len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Per-workspace settings kept on the workspace-root record.
///
/// Every field has a default, so partially written blobs read back complete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceSetting {
    /// File name last used when exporting the workspace.
    pub file_name: String,
    /// Password last used when exporting the workspace.
    pub password: String,
    /// Paths of the open tabs, in tab order.
    pub tabs: Vec<String>,
    /// Path of the focused tab.
    pub current_tab: Option<String>,
}

/// A row of the store.
///
/// `file` absent means the record is a folder placeholder (or, for a key
/// without `/`, a workspace root). `dist_file` is the derived artifact that is
/// preferred when serving.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileRecord {
    pub path: String,
    pub file: Option<Payload>,
    pub dist_file: Option<Payload>,
    pub label: Option<String>,
    pub setting: Option<WorkspaceSetting>,
}

impl FileRecord {
    pub fn file(path: impl Into<String>, payload: Payload) -> Self {
        Self {
            path: path.into(),
            file: Some(payload),
            ..Default::default()
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn workspace_root(
        name: impl Into<String>,
        label: impl Into<String>,
        setting: WorkspaceSetting,
    ) -> Self {
        Self {
            path: name.into(),
            label: Some(label.into()),
            setting: Some(setting),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_dist_file(mut self, dist_file: Payload) -> Self {
        self.dist_file = Some(dist_file);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_folder(&self) -> bool {
        self.file.is_none()
    }

    /// Zero-depth keys are workspace roots.
    pub fn is_workspace_root(&self) -> bool {
        !self.path.contains('/')
    }

    /// The payload to hand out: the derived one when asked for and present,
    /// otherwise the source.
    pub fn served_payload(&self, prefer_derived: bool) -> Option<&Payload> {
        if prefer_derived {
            if let Some(dist) = &self.dist_file {
                return Some(dist);
            }
        }
        self.file.as_ref()
    }

    /// Settings with defaults filled in.
    pub fn setting_or_default(&self) -> WorkspaceSetting {
        self.setting.clone().unwrap_or_default()
    }
}
