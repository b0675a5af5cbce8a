//! File and folder name rules.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{Result, VfsError};

/// Check one path segment.
///
/// A name must be non-empty, must not be `.` or `..`, and must not contain
/// any of `\ / : * ? " < > |`.
pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    lazy_static! {
        static ref FORBIDDEN: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
    }

    if name.is_empty() {
        return Err("empty name".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("'{}' is reserved", name));
    }
    if let Some(m) = FORBIDDEN.find(name) {
        return Err(format!("'{}' is not allowed in names", m.as_str()));
    }
    Ok(())
}

/// Check every segment of a relative path.
pub fn validate_path(path: &str) -> Result<()> {
    for segment in path.split('/') {
        validate_name(segment).map_err(|message| VfsError::InvalidPath {
            path: path.to_string(),
            message,
        })?;
    }
    Ok(())
}

/// Every proper ancestor of `path`, nearest last: `a/b/c` gives `a`, `a/b`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

/// The last segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
