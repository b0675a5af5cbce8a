//! Command execution.
//!
//! Commands:
//! - `workspaces` - List workspaces
//! - `ls [path]` - List files and folders
//! - `tree` - Show the workspace as a tree
//! - `mkdir <path>` / `add <path>` - Create a folder or file
//! - `cat <path>` / `put <path>` - Read or replace a file
//! - `mv <old> <new>` - Move with validation
//! - `rm <path>` / `clear` - Delete
//! - `setting` - Print workspace settings
//! - `resolve <url>` - Show how the preview server would answer

use std::fmt::Write as _;
use std::path::Path;

use bytes::Bytes;
use nu_ansi_term::{Color, Style};
use serde::Serialize;
use workbench_resolver::{Resolution, Resolver};
use workbench_store::{Payload, RecordStore, WorkspaceSetting};
use workbench_vfs::tree::{FileTree, Node};
use workbench_vfs::{mime, workspace, Entry, Vfs, VfsError};

use crate::args::VfsCommand;
use crate::CliError;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Text for the terminal
    Display(String),
    /// Raw file contents, written as-is
    Bytes(Bytes),
}

impl CommandResult {
    fn ok() -> Self {
        CommandResult::Display(Color::Green.paint("ok").to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceJson {
    name: String,
    label: String,
    setting: WorkspaceSetting,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryJson<'a> {
    path: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    has_derived: bool,
}

impl<'a> From<&'a Entry> for EntryJson<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            path: &entry.path,
            kind: if entry.is_folder() { "folder" } else { "file" },
            mime_type: entry
                .file
                .as_ref()
                .and_then(|file| file.mime_type.as_ref())
                .map(|mime_type| mime_type.as_str()),
            size: entry.file.as_ref().map(Payload::len),
            has_derived: entry.dist_file.is_some(),
        }
    }
}

/// Execute a command against the selected workspace.
pub fn execute<S: RecordStore>(
    command: &VfsCommand,
    vfs: &Vfs<S>,
) -> Result<CommandResult, CliError> {
    match command {
        VfsCommand::Workspaces { json } => cmd_workspaces(vfs, *json),
        VfsCommand::Ls { path, json } => cmd_ls(vfs, path.as_deref(), *json),
        VfsCommand::Tree => cmd_tree(vfs),
        VfsCommand::Mkdir { path } => {
            vfs.add([Entry::folder(path.as_str())])?;
            Ok(CommandResult::ok())
        }
        VfsCommand::Add { path, from } => {
            let bytes = match from {
                Some(file) => read_file(file)?,
                None => Bytes::new(),
            };
            vfs.add([Entry::file(path.as_str(), Payload::new(bytes, None))])?;
            Ok(CommandResult::ok())
        }
        VfsCommand::Cat { path, source } => cmd_cat(vfs, path, *source),
        VfsCommand::Put { path, from, dist } => {
            let payload = Payload::new(read_file(from)?, None);
            let derived = match dist {
                Some(file) => Some(Payload::new(
                    read_file(file)?,
                    mime::infer(&file.to_string_lossy()),
                )),
                None => None,
            };
            vfs.put(path, payload, derived)?;
            Ok(CommandResult::ok())
        }
        VfsCommand::Mv { old, new } => {
            let moved = vfs.rename(old, new)?;
            let mut out = String::new();
            for (from, to) in &moved {
                let _ = writeln!(
                    out,
                    "{} {} {}",
                    from,
                    Color::DarkGray.paint("→"),
                    Color::Cyan.paint(to)
                );
            }
            Ok(CommandResult::Display(with_summary(out, "moved", moved.len())))
        }
        VfsCommand::Rm { path } => {
            let removed = vfs.remove(path)?;
            Ok(CommandResult::Display(removed_summary(&removed)))
        }
        VfsCommand::Clear => {
            let removed = vfs.remove_all()?;
            Ok(CommandResult::Display(removed_summary(&removed)))
        }
        VfsCommand::Setting => {
            let setting = vfs.setting()?;
            Ok(CommandResult::Display(serde_json::to_string_pretty(
                &setting,
            )?))
        }
        VfsCommand::Resolve { url, resolver } => {
            let resolver = Resolver::new(vfs.store(), resolver.config());
            Ok(CommandResult::Display(describe(
                &resolver.resolve_url(url)?,
                &resolver.config().debug_root,
            )))
        }
    }
}

fn read_file(path: &Path) -> Result<Bytes, CliError> {
    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}

fn cmd_workspaces<S: RecordStore>(vfs: &Vfs<S>, json: bool) -> Result<CommandResult, CliError> {
    let workspaces = workspace::list_workspaces(vfs.store())?;

    if json {
        let rows: Vec<WorkspaceJson> = workspaces
            .into_iter()
            .map(|ws| WorkspaceJson {
                name: ws.name,
                label: ws.label,
                setting: ws.setting,
            })
            .collect();
        return Ok(CommandResult::Display(serde_json::to_string_pretty(&rows)?));
    }

    let mut out = String::new();
    for ws in &workspaces {
        let marker = if ws.name == vfs.workspace() { "*" } else { " " };
        let _ = write!(out, "{} {}", Color::Green.paint(marker), ws.name);
        if ws.label != ws.name {
            let _ = write!(out, " {}", Color::DarkGray.paint(format!("({})", ws.label)));
        }
        out.push('\n');
    }
    Ok(CommandResult::Display(out.trim_end().to_string()))
}

fn cmd_ls<S: RecordStore>(
    vfs: &Vfs<S>,
    path: Option<&str>,
    json: bool,
) -> Result<CommandResult, CliError> {
    let listing = vfs.list_all()?;
    let under = |entry: &&Entry| match path {
        None => true,
        Some(base) => {
            let base = base.trim_end_matches('/');
            entry.path == base || entry.path.starts_with(&format!("{}/", base))
        }
    };
    let entries: Vec<&Entry> = listing
        .folders
        .iter()
        .chain(listing.files.iter())
        .filter(under)
        .collect();

    if json {
        let rows: Vec<EntryJson> = entries.into_iter().map(EntryJson::from).collect();
        return Ok(CommandResult::Display(serde_json::to_string_pretty(&rows)?));
    }

    if entries.is_empty() {
        return Ok(CommandResult::Display(
            Color::Yellow.paint("(empty)").to_string(),
        ));
    }

    let mut out = String::new();
    for entry in entries {
        match &entry.file {
            None => {
                let _ = writeln!(out, "{}", Color::Cyan.paint(format!("{}/", entry.path)));
            }
            Some(file) => {
                let mime_type = file
                    .mime_type
                    .as_ref()
                    .map(|m| m.as_str())
                    .unwrap_or("-");
                let derived = if entry.dist_file.is_some() { " +dist" } else { "" };
                let _ = writeln!(
                    out,
                    "{}  {}",
                    entry.path,
                    Color::DarkGray.paint(format!("{} {}B{}", mime_type, file.len(), derived))
                );
            }
        }
    }
    Ok(CommandResult::Display(out.trim_end().to_string()))
}

fn cmd_tree<S: RecordStore>(vfs: &Vfs<S>) -> Result<CommandResult, CliError> {
    let tree = FileTree::from_listing(&vfs.list_all()?);
    let mut out = Style::new().bold().paint(vfs.workspace()).to_string();
    for item in tree.walk() {
        let indent = "  ".repeat(item.depth + 1);
        let name = match item.node {
            Node::Folder(folder) if folder.explicit => {
                Color::Cyan.paint(format!("{}/", item.name)).to_string()
            }
            Node::Folder(_) => Color::Cyan
                .dimmed()
                .paint(format!("{}/", item.name))
                .to_string(),
            Node::File(_) => item.name.to_string(),
        };
        let _ = write!(out, "\n{}{}", indent, name);
    }
    Ok(CommandResult::Display(out))
}

fn cmd_cat<S: RecordStore>(
    vfs: &Vfs<S>,
    path: &str,
    source: bool,
) -> Result<CommandResult, CliError> {
    match vfs.get(path, !source)? {
        Some(payload) => Ok(CommandResult::Bytes(payload.bytes)),
        None => match vfs.lookup(path)? {
            Some(entry) if entry.is_folder() => Err(VfsError::IsFolder {
                path: path.to_string(),
            }
            .into()),
            _ => Err(VfsError::NotFound {
                path: path.to_string(),
            }
            .into()),
        },
    }
}

fn with_summary(mut out: String, verb: &str, count: usize) -> String {
    let _ = write!(
        out,
        "{} {} {}",
        Color::Green.paint("ok"),
        verb,
        Color::Yellow.paint(count.to_string())
    );
    out
}

fn removed_summary(removed: &[String]) -> String {
    let mut out = String::new();
    for path in removed {
        let _ = writeln!(out, "{}", Color::DarkGray.paint(path));
    }
    with_summary(out, "removed", removed.len())
}

fn describe(resolution: &Resolution, root: &str) -> String {
    let response = match resolution {
        Resolution::Declined => {
            return Color::Yellow
                .paint(format!("declined (not under {})", root))
                .to_string()
        }
        Resolution::Response(response) => response,
    };

    let status = response.status();
    let color = if status.is_success() {
        Color::Green
    } else if status.is_redirection() {
        Color::Cyan
    } else {
        Color::Red
    };
    let mut out = color.paint(status.to_string()).to_string();
    for (name, value) in response.headers() {
        let _ = write!(
            out,
            "\n{}: {}",
            Style::new().bold().paint(name.as_str()),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    out
}
