//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use workbench_resolver::ResolverConfig;

use crate::CliError;

/// Workbench - browse, edit and preview workspaces in a Workbench database
#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database file [default: <data dir>/workbench/workbench.db]
    #[arg(long, env = "WORKBENCH_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Workspace to operate on
    #[arg(
        long,
        short,
        env = "WORKBENCH_WORKSPACE",
        default_value = "workspace1",
        global = true
    )]
    pub workspace: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The database path, falling back to the platform data directory.
    pub fn db_path(&self) -> Result<PathBuf, CliError> {
        match &self.db {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("workbench").join("workbench.db"))
                .ok_or(CliError::NoDataDir),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve workspaces over HTTP
    Serve(ServeArgs),

    #[command(flatten)]
    Vfs(VfsCommand),
}

/// Commands that work on the selected workspace.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VfsCommand {
    /// List workspaces
    Workspaces {
        #[arg(long)]
        json: bool,
    },

    /// List files and folders, optionally under a path
    Ls {
        path: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Show the workspace as a tree
    Tree,

    /// Create a folder
    Mkdir { path: String },

    /// Create a file, empty or copied from disk
    Add {
        path: String,
        /// Read contents from this file
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Print a file
    Cat {
        path: String,
        /// Print the source even when a derived payload exists
        #[arg(long)]
        source: bool,
    },

    /// Replace the contents of an existing file
    Put {
        path: String,
        /// Read contents from this file
        #[arg(long)]
        from: PathBuf,
        /// Store this file as the derived payload
        #[arg(long)]
        dist: Option<PathBuf>,
    },

    /// Move or rename a file or folder
    Mv { old: String, new: String },

    /// Delete a file or folder and everything under it
    Rm { path: String },

    /// Delete everything in the workspace
    Clear,

    /// Print the workspace settings as JSON
    Setting,

    /// Show how a URL would be answered
    Resolve {
        url: String,
        #[command(flatten)]
        resolver: ResolverArgs,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ResolverArgs {
    /// URL prefix served from the database
    #[arg(long, default_value = "/debug/")]
    pub root: String,

    /// Extension tried for bare names; empty disables the guess
    #[arg(long, default_value = "ts")]
    pub fallback_ext: String,

    /// File served for a URL ending in `/`
    #[arg(long, default_value = "index.html")]
    pub index_file: String,
}

impl ResolverArgs {
    pub fn config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_debug_root(&self.root)
            .with_fallback_extension(&self.fallback_ext)
            .with_index_file(&self.index_file)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:7878")]
    pub addr: String,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}
