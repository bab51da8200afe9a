//! Durable [`Storer`] engine backed by a single sqlite table.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, ErrorCode};

use crate::store::{StoreError, Storer};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        seq        INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        key        TEXT NOT NULL,
        value      BLOB NOT NULL,
        UNIQUE (collection, key)
    );
";

/// Sqlite-backed document store. One connection, serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "sqlite store opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl Storer for SqliteStore {
    fn insert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO records (collection, key, value) VALUES (?1, ?2, ?3)",
            params![collection, key, doc],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Duplicate {
                    collection: collection.to_string(),
                    key: key.to_string(),
                }
            } else {
                StoreError::Sqlite(e)
            }
        })?;
        Ok(())
    }

    fn upsert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO records (collection, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, key) DO UPDATE SET value = excluded.value",
            params![collection, key, doc],
        )?;
        Ok(())
    }

    fn scan(&self, collection: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt =
            conn.prepare("SELECT value FROM records WHERE collection = ?1 ORDER BY seq")?;
        let docs = stmt
            .query_map(params![collection], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }
}
