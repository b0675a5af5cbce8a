//! SQLite backend.
//!
//! The table lives in a single database file. Two `SqliteStore`s opened on the
//! same file behave like two independent execution contexts: they share no
//! memory, only the rows.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use tracing::debug;

use crate::error::from_sqlite;
use crate::range::Span;
use crate::{
    FileRecord, KeyRange, MimeType, Payload, RecordStore, Result, Rewrite, StoreError,
    WorkspaceSetting,
};

/// Schema SQL embedded from schema/files.sql.
const SCHEMA_SQL: &str = include_str!("../schema/files.sql");

const SELECT: &str = "SELECT path, file, file_type, dist, dist_type, label, setting FROM files";

/// How long a connection waits on another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A record table in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    fresh: bool,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories and the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;

        debug!(path = %path.display(), "opening record store");
        Self::init(conn)
    }

    /// Create a private in-memory database (for tests and scratch use).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let existing: i64 = conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'files'",
            [],
            |row| row.get(0),
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            fresh: existing == 0,
        })
    }

    /// Whether the schema was created by this open, i.e. this is a first run.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Raw column values of one row.
struct Row {
    path: String,
    file: Option<Vec<u8>>,
    file_type: Option<String>,
    dist: Option<Vec<u8>>,
    dist_type: Option<String>,
    label: Option<String>,
    setting: Option<String>,
}

impl Row {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            path: row.get(0)?,
            file: row.get(1)?,
            file_type: row.get(2)?,
            dist: row.get(3)?,
            dist_type: row.get(4)?,
            label: row.get(5)?,
            setting: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<FileRecord> {
        let setting = match self.setting {
            Some(json) => Some(serde_json::from_str::<WorkspaceSetting>(&json).map_err(|e| {
                StoreError::Corrupt {
                    key: self.path.clone(),
                    message: format!("setting: {}", e),
                }
            })?),
            None => None,
        };

        Ok(FileRecord {
            file: self
                .file
                .map(|bytes| Payload::new(bytes, self.file_type.map(MimeType::from))),
            dist_file: self
                .dist
                .map(|bytes| Payload::new(bytes, self.dist_type.map(MimeType::from))),
            label: self.label,
            setting,
            path: self.path,
        })
    }
}

fn payload_bytes(payload: &Option<Payload>) -> Option<&[u8]> {
    payload.as_ref().map(|p| p.bytes.as_ref())
}

fn payload_type(payload: &Option<Payload>) -> Option<&str> {
    payload
        .as_ref()
        .and_then(|p| p.mime_type.as_ref())
        .map(MimeType::as_str)
}

fn setting_json(record: &FileRecord) -> Result<Option<String>> {
    record
        .setting
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

fn insert_row(conn: &Connection, record: &FileRecord) -> Result<()> {
    let setting = setting_json(record)?;
    conn.execute(
        "INSERT INTO files (path, file, file_type, dist, dist_type, label, setting)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.path,
            payload_bytes(&record.file),
            payload_type(&record.file),
            payload_bytes(&record.dist_file),
            payload_type(&record.dist_file),
            record.label,
            setting,
        ],
    )
    .map_err(|e| from_sqlite(&record.path, e))?;
    Ok(())
}

fn select_one(conn: &Connection, key: &str) -> Result<Option<FileRecord>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE path = ?1", SELECT))?;
    let row = stmt.query_row(params![key], Row::read).optional()?;
    row.map(Row::into_record).transpose()
}

fn select_range(conn: &Connection, range: &KeyRange) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    for span in range.spans() {
        match span {
            Span::Key(key) => records.extend(select_one(conn, key)?),
            Span::Prefix(prefix) => {
                let prefix: &str = &prefix;
                // Keys sharing a prefix are contiguous in BINARY order; stop at
                // the first one that doesn't match.
                let mut stmt =
                    conn.prepare_cached(&format!("{} WHERE path >= ?1 ORDER BY path", SELECT))?;
                let rows = stmt.query_map(params![prefix], Row::read)?;
                for row in rows {
                    let row = row?;
                    if !row.path.starts_with(prefix) {
                        break;
                    }
                    records.push(row.into_record()?);
                }
            }
            Span::TopLevel => {
                // filtered in SQL so payloads under the roots are never read
                let mut stmt = conn.prepare_cached(&format!(
                    "{} WHERE instr(path, '/') = 0 ORDER BY path",
                    SELECT
                ))?;
                let rows = stmt.query_map([], Row::read)?;
                for row in rows {
                    records.push(row?.into_record()?);
                }
            }
        }
    }
    Ok(records)
}

fn delete_keys(tx: &Transaction<'_>, keys: &[String]) -> Result<()> {
    let mut stmt = tx.prepare_cached("DELETE FROM files WHERE path = ?1")?;
    for key in keys {
        stmt.execute(params![key])?;
    }
    Ok(())
}

impl RecordStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<FileRecord>> {
        let conn = self.lock()?;
        select_one(&conn, key)
    }

    fn insert(&self, record: FileRecord) -> Result<()> {
        let conn = self.lock()?;
        debug!(key = %record.path, "insert");
        insert_row(&conn, &record)
    }

    fn update(&self, record: FileRecord) -> Result<bool> {
        let conn = self.lock()?;
        let setting = setting_json(&record)?;
        let changed = conn.execute(
            "UPDATE files SET file = ?2, file_type = ?3, dist = ?4, dist_type = ?5,
                              label = ?6, setting = ?7
             WHERE path = ?1",
            params![
                record.path,
                payload_bytes(&record.file),
                payload_type(&record.file),
                payload_bytes(&record.dist_file),
                payload_type(&record.dist_file),
                record.label,
                setting,
            ],
        )?;
        if changed > 0 {
            debug!(key = %record.path, "update");
        }
        Ok(changed > 0)
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<FileRecord>> {
        let conn = self.lock()?;
        // a subtree is two queries; read both from one snapshot
        let tx = conn.unchecked_transaction()?;
        let records = select_range(&tx, range)?;
        tx.commit()?;
        Ok(records)
    }

    fn delete(&self, range: &KeyRange) -> Result<Vec<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let keys: Vec<String> = select_range(&tx, range)?
            .into_iter()
            .map(|record| record.path)
            .collect();
        delete_keys(&tx, &keys)?;
        tx.commit()?;
        debug!(%range, count = keys.len(), "delete");
        Ok(keys)
    }

    fn rewrite(&self, range: &KeyRange, f: &mut Rewrite<'_>) -> Result<Vec<(String, String)>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let records = select_range(&tx, range)?;
        let old_keys: Vec<String> = records.iter().map(|record| record.path.clone()).collect();
        let rewritten: Vec<FileRecord> = records.into_iter().map(|record| f(record)).collect();

        // Old rows go first so records may trade places inside the range. Any
        // clash left over is a unique-key violation and drops the transaction.
        delete_keys(&tx, &old_keys)?;
        for record in &rewritten {
            insert_row(&tx, record)?;
        }
        tx.commit()?;

        let pairs: Vec<(String, String)> = old_keys
            .into_iter()
            .zip(rewritten.into_iter().map(|record| record.path))
            .collect();
        debug!(%range, count = pairs.len(), "rewrite");
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, body: &str, mime: Option<MimeType>) -> FileRecord {
        FileRecord::file(path, Payload::new(body.to_string(), mime))
    }

    #[test]
    fn subtree_scan_closes_its_transaction() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(FileRecord::folder("ws/src")).unwrap();
        store.insert(file("ws/src/a.ts", "a", None)).unwrap();
        store.insert(file("ws/src-old.ts", "old", None)).unwrap();

        let keys: Vec<String> = store
            .scan(&KeyRange::subtree("ws/src"))
            .unwrap()
            .into_iter()
            .map(|record| record.path)
            .collect();
        assert_eq!(keys, ["ws/src", "ws/src/a.ts"]);
        assert!(store.lock().unwrap().is_autocommit());

        // the connection is free for a write transaction right after
        assert_eq!(store.delete(&KeyRange::subtree("ws/src")).unwrap().len(), 2);
    }

    #[test]
    fn fresh_database_reports_first_run() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_fresh());
    }

    #[test]
    fn record_columns_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let record = file("ws/a.ts", "let a: number = 1", Some(MimeType::TYPESCRIPT))
            .with_dist_file(Payload::new("let a = 1", Some(MimeType::JAVASCRIPT)));
        store.insert(record.clone()).unwrap();

        assert_eq!(store.get("ws/a.ts").unwrap(), Some(record));
    }

    #[test]
    fn folder_and_empty_file_are_distinct() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(FileRecord::folder("ws/dir")).unwrap();
        store.insert(file("ws/empty", "", None)).unwrap();

        assert!(store.get("ws/dir").unwrap().unwrap().is_folder());
        let empty = store.get("ws/empty").unwrap().unwrap();
        assert!(empty.is_file());
        assert_eq!(empty.file.unwrap().mime_type, None);
    }

    #[test]
    fn workspace_root_setting_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let setting = WorkspaceSetting {
            tabs: vec!["index.html".to_string(), "main.ts".to_string()],
            current_tab: Some("main.ts".to_string()),
            ..Default::default()
        };
        store
            .insert(FileRecord::workspace_root("ws", "Workspace", setting.clone()))
            .unwrap();

        let root = store.get("ws").unwrap().unwrap();
        assert_eq!(root.setting, Some(setting));
        assert_eq!(root.label.as_deref(), Some("Workspace"));
    }

    #[test]
    fn corrupt_setting_is_reported() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO files (path, setting) VALUES ('ws', 'not json')",
                [],
            )
            .unwrap();

        let err = store.get("ws").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "ws"));
    }

    #[test]
    fn insert_conflict() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(file("ws/a.txt", "first", None)).unwrap();
        let err = store.insert(file("ws/a.txt", "second", None)).unwrap_err();
        assert!(err.is_conflict());
        let kept = store.get("ws/a.txt").unwrap().unwrap();
        assert_eq!(kept.file.unwrap().bytes, "first".as_bytes());
    }

    #[test]
    fn rewrite_conflict_rolls_back() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(FileRecord::folder("ws/a")).unwrap();
        store.insert(file("ws/a/x.js", "x", None)).unwrap();
        store.insert(file("ws/b/x.js", "other", None)).unwrap();

        let err = store
            .rewrite(&KeyRange::subtree("ws/a"), &mut |record| {
                let path = record.path.replacen("ws/a", "ws/b", 1);
                record.with_path(path)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref key } if key == "ws/b/x.js"));

        assert!(store.get("ws/a").unwrap().is_some());
        assert!(store.get("ws/a/x.js").unwrap().is_some());
        assert!(store.get("ws/b").unwrap().is_none());
        let untouched = store.get("ws/b/x.js").unwrap().unwrap();
        assert_eq!(untouched.file.unwrap().bytes, "other".as_bytes());
    }
}
