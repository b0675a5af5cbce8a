//! Workbench virtual filesystem.
//!
//! A tree of files and folders kept in the flat record table of
//! `workbench-store`. A path `src/main.ts` in workspace `workspace1` is the
//! record keyed `workspace1/src/main.ts`; the tree exists only in the keys:
//! - `Namespace`: relative path <-> global key for the active workspace
//! - `Vfs`: list, add, remove, move, get and put by relative path
//! - `workspace`: the zero-depth workspace root records
//! - `FileTree`: a cached tree view rebuilt from a listing
//!
//! # Example
//!
//! ```rust
//! use workbench_store::{MemoryStore, MimeType, Payload};
//! use workbench_vfs::{Entry, Vfs, VfsConfig};
//!
//! let vfs = Vfs::open(MemoryStore::new(), &VfsConfig::default()).unwrap();
//! vfs.add([Entry::file("src/main.js", Payload::new("console.log(1)", None))])
//!     .unwrap();
//!
//! let moved = vfs.rename("src/main.js", "src/main.ts").unwrap();
//! assert_eq!(moved, [("src/main.js".to_string(), "src/main.ts".to_string())]);
//!
//! let payload = vfs.get("src/main.ts", true).unwrap().unwrap();
//! assert_eq!(payload.mime_type, Some(MimeType::TYPESCRIPT));
//! ```

mod error;
pub mod mime;
pub mod name;
mod namespace;
pub mod tree;
mod vfs;
pub mod workspace;

pub use error::{MoveRejection, VfsError};
pub use namespace::{validate_workspace, Namespace};
pub use tree::{FileTree, Node};
pub use vfs::{Entry, Listing, Vfs};
pub use workspace::{VfsConfig, Workspace};

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, VfsError>;
