//! Error types for the store layer.
//!
//! Only one condition here has domain meaning: `Conflict`, raised when a write
//! would produce a key that already exists. Everything else is an
//! infrastructure failure that callers propagate unchanged.

use thiserror::Error;

/// Errors raised by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would create a key that is already occupied.
    #[error("key already exists: {key}")]
    Conflict { key: String },

    /// The SQLite backend failed (I/O, quota, corruption, schema mismatch).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored column could not be decoded.
    #[error("corrupt record at '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The workspace setting blob could not be encoded.
    #[error("setting encode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another thread panicked while holding the table lock.
    #[error("lock poisoned")]
    Poisoned,

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error reports an occupied key.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Map a SQLite unique-constraint failure on `key` to `Conflict`.
pub(crate) fn from_sqlite(key: &str, err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            StoreError::Conflict {
                key: key.to_string(),
            }
        }
        _ => StoreError::Sqlite(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn conflict_display() {
        let e = StoreError::Conflict {
            key: "workspace1/a.txt".to_string(),
        };
        assert_eq!(format!("{}", e), "key already exists: workspace1/a.txt");
        assert!(e.is_conflict());
    }

    #[test]
    fn corrupt_display() {
        let e = StoreError::Corrupt {
            key: "workspace1".to_string(),
            message: "bad json".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("workspace1"));
        assert!(display.contains("bad json"));
        assert!(!e.is_conflict());
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: StoreError = io_err.into();
        assert!(matches!(e, StoreError::Io(_)));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn non_constraint_sqlite_error_passes_through() {
        let e = from_sqlite("k", rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(e, StoreError::Sqlite(_)));
    }
}
