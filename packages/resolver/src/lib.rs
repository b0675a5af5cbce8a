//! Workbench resource resolver.
//!
//! Turns request URLs under a debug root into HTTP responses read straight
//! from the record store:
//! - a file: `200` with the derived payload if there is one, else the source
//! - a folder placeholder: `301` to the same URL with a trailing `/`
//! - nothing: `404`, after one retry with a fallback extension for bare
//!   names
//!
//! Paths ending in `/` are served from their index file. [`AsyncResolver`]
//! does the same over an `AsyncRecordStore`.
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use workbench_resolver::{Resolver, ResolverConfig};
//! use workbench_store::{FileRecord, MemoryStore, MimeType, Payload};
//!
//! let store = MemoryStore::with_records([FileRecord::file(
//!     "ws/util.ts",
//!     Payload::new("export const x = 1", Some(MimeType::TYPESCRIPT)),
//! )]);
//! let resolver = Resolver::new(store, ResolverConfig::default());
//!
//! let resolution = resolver.resolve_url("/debug/ws/util").unwrap();
//! assert_eq!(resolution.status(), Some(StatusCode::OK));
//! ```

mod async_resolver;
mod config;
mod error;
mod resolver;
mod target;

pub use async_resolver::AsyncResolver;
pub use config::ResolverConfig;
pub use error::ResolveError;
pub use resolver::{Resolution, Resolver};
pub use target::Target;

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
