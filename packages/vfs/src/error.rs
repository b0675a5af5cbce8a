//! Error types for the filesystem layer.

use std::fmt;

use thiserror::Error;
use workbench_store::StoreError;

/// Why a move was refused before touching the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    /// Source and destination are the same path.
    SamePath,
    /// The destination lies inside the source.
    IntoDescendant,
    /// Something already lives at the destination.
    DestinationOccupied,
    /// Nothing lives at the source.
    NotFound,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            MoveRejection::SamePath => "source and destination are the same",
            MoveRejection::IntoDescendant => "destination is inside the source",
            MoveRejection::DestinationOccupied => "destination already exists",
            MoveRejection::NotFound => "source does not exist",
        };
        f.write_str(reason)
    }
}

/// Errors raised by [`Vfs`](crate::Vfs) operations.
///
/// Paths in these errors are relative to the active workspace.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The target path is already taken. The caller should pick another name.
    #[error("'{path}' already exists")]
    Collision { path: String },

    #[error("cannot move '{from}' to '{to}': {reason}")]
    InvalidMove {
        from: String,
        to: String,
        reason: MoveRejection,
    },

    #[error("'{path}' not found")]
    NotFound { path: String },

    #[error("'{path}' is a folder")]
    IsFolder { path: String },

    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("invalid workspace name '{name}'")]
    InvalidWorkspace { name: String },

    /// Infrastructure failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VfsError {
    /// Translate a store error raised while writing `path`.
    ///
    /// Only `Conflict` has a filesystem meaning; everything else passes
    /// through.
    pub(crate) fn from_store(path: &str, err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => VfsError::Collision {
                path: path.to_string(),
            },
            other => VfsError::Store(other),
        }
    }

    pub(crate) fn invalid_move(from: &str, to: &str, reason: MoveRejection) -> Self {
        VfsError::InvalidMove {
            from: from.to_string(),
            to: to.to_string(),
            reason,
        }
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, VfsError::Collision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_becomes_collision_with_relative_path() {
        let err = VfsError::from_store(
            "src/a.ts",
            StoreError::Conflict {
                key: "workspace1/src/a.ts".to_string(),
            },
        );
        assert!(matches!(err, VfsError::Collision { ref path } if path == "src/a.ts"));
        assert!(err.is_collision());
    }

    #[test]
    fn other_store_errors_pass_through() {
        let err = VfsError::from_store("a", StoreError::Poisoned);
        assert!(matches!(err, VfsError::Store(StoreError::Poisoned)));
        assert_eq!(err.to_string(), "lock poisoned");
    }

    #[test]
    fn invalid_move_display() {
        let err = VfsError::invalid_move("src", "src/lib", MoveRejection::IntoDescendant);
        assert_eq!(
            err.to_string(),
            "cannot move 'src' to 'src/lib': destination is inside the source"
        );
    }
}
