//! Workbench command-line driver.
//!
//! Opens a SQLite-backed store, runs one filesystem command against the
//! selected workspace, or serves every workspace over HTTP.

pub mod args;
pub mod commands;
mod error;
pub mod server;

use std::io::Write;

use tracing::debug;
use workbench_store::SqliteStore;
use workbench_vfs::{workspace, Vfs, VfsConfig};

pub use args::{Cli, Command};
pub use commands::{execute, CommandResult};
pub use error::CliError;

/// Run a parsed command line to completion.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let db = cli.db_path()?;
    if let Some(dir) = db.parent() {
        std::fs::create_dir_all(dir)?;
    }
    debug!(db = %db.display(), workspace = %cli.workspace, "opening store");

    match &cli.command {
        Command::Serve(args) => {
            let store = SqliteStore::open(&db)?;
            workspace::ensure_workspaces(&store, workspace::DEFAULT_WORKSPACE_COUNT)?;
            server::serve(store, args)
        }
        Command::Vfs(command) => {
            let vfs = Vfs::open(SqliteStore::open(&db)?, &VfsConfig::new(&cli.workspace))?;
            let result = execute(command, &vfs)?;
            print(result)
        }
    }
}

fn print(result: CommandResult) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    match result {
        CommandResult::Display(text) => writeln!(stdout, "{}", text)?,
        CommandResult::Bytes(bytes) => stdout.write_all(&bytes)?,
    }
    stdout.flush()?;
    Ok(())
}
