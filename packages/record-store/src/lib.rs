//! Workbench record store: the persistent table under the virtual filesystem.
//!
//! Everything at this level is a flat table of [`FileRecord`]s keyed by a
//! unique path string. There is no notion of folders or workspaces here
//! beyond what the keys spell out:
//! - `KeyRange`: which keys an operation touches (exact, subtree, prefix)
//! - `RecordStore`: point lookup, insert, update, ordered scan, and atomic
//!   range delete/rewrite
//! - `MemoryStore` / `SqliteStore`: the two backends
//!
//! Hierarchy, namespacing, and MIME inference live in `workbench-vfs`.
//!
//! # Example
//!
//! ```rust
//! use workbench_store::{FileRecord, KeyRange, MemoryStore, Payload, RecordStore};
//!
//! let store = MemoryStore::new();
//! store.insert(FileRecord::folder("workspace1/src")).unwrap();
//! store
//!     .insert(FileRecord::file("workspace1/src/main.ts", Payload::new("let x = 1", None)))
//!     .unwrap();
//!
//! let keys: Vec<String> = store
//!     .scan(&KeyRange::subtree("workspace1/src"))
//!     .unwrap()
//!     .into_iter()
//!     .map(|record| record.path)
//!     .collect();
//! assert_eq!(keys, ["workspace1/src", "workspace1/src/main.ts"]);
//! ```
//!
//! # Async Support
//!
//! The `async` feature (on by default) adds `AsyncRecordStore` and the
//! `SyncToAsync` adapter, which the preview server resolves through.

pub use bytes::Bytes;

mod error;
mod memory;
mod mime_type;
mod range;
mod record;
mod sqlite;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mime_type::MimeType;
pub use range::KeyRange;
pub use record::{FileRecord, Payload, WorkspaceSetting};
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, Rewrite};

#[cfg(feature = "async")]
mod async_traits;

#[cfg(feature = "async")]
pub use async_traits::{AsyncRecordStore, AsyncRewrite, SyncToAsync};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
