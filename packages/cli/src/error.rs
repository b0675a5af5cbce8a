use std::path::PathBuf;

use workbench_resolver::ResolveError;
use workbench_store::StoreError;
use workbench_vfs::VfsError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Vfs(#[from] VfsError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {message}")]
    Server { message: String },

    #[error("No data directory on this system; pass --db")]
    NoDataDir,
}
