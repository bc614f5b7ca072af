/*!
 * Keyed session store.
 *
 * Persistence is a pluggable collaborator behind the `SessionStore` trait:
 * an in-memory map for tests and ephemeral runs, and a SQLite backend for
 * durable sessions. Session state is stored as JSON columns; the schema is
 * versioned for migrations.
 *
 * `SessionLanes` provides the one-logical-writer-per-session-key rule: all
 * controller mutations of a session happen while holding its lane.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::StoreError;
use crate::session::models::Session;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "veditai.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "veditai";

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Keyed session storage
///
/// Implementations must be safe to share across tasks; write ordering per
/// session is the caller's responsibility (see [`SessionLanes`]).
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id, if it exists
    fn get(&self, id: &str) -> Result<Option<Session>, StoreError>;

    /// Insert or replace a session
    fn put(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove a session; returns true if it existed
    fn remove(&self, id: &str) -> Result<bool, StoreError>;

    /// List all stored session ids
    fn list_ids(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().get(id).cloned())
    }

    fn put(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.write().remove(id).is_some())
    }

    fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// SQLite-backed session store
pub struct SqliteSessionStore {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection
    connection: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open the store at the default location under the user data directory
    pub fn new_default() -> Result<Self, StoreError> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open the store at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!(
                    "Failed to create database directory {:?}: {}",
                    parent, e
                ))
            })?;
        }

        info!("Opening session database at: {:?}", db_path);

        let conn = Connection::open(&db_path)?;
        initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        debug!("Creating in-memory session database");

        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Mutex::new(conn),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf, StoreError> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| StoreError::Backend("Could not determine data directory".to_string()))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.connection.lock();

        let state: Option<String> = conn
            .query_row("SELECT state FROM sessions WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        match state {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, session: &Session) -> Result<(), StoreError> {
        let state = serde_json::to_string(session)?;
        let conn = self.connection.lock();

        conn.execute(
            "INSERT INTO sessions (id, video_path, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 video_path = excluded.video_path,
                 state = excluded.state,
                 updated_at = excluded.updated_at",
            params![
                session.id,
                session.video_path.to_string_lossy().into_owned(),
                state,
                session.created_at,
                session.updated_at,
            ],
        )?;

        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.connection.lock();
        let affected = conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connection.lock();

        let mut stmt = conn.prepare("SELECT id FROM sessions ORDER BY updated_at DESC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }
}

/// Initialize the database schema
fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing session database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        return Err(StoreError::Backend(format!(
            "Unknown schema version: {}. Cannot migrate.",
            current_version
        )));
    } else {
        debug!("Session database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<(), StoreError> {
    // WAL mode for better concurrency and crash recovery
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            video_path TEXT NOT NULL,
            state TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at);
        "#,
    )?;

    Ok(())
}

/// Per-session write lanes.
///
/// Every session mutation must run while holding that session's lane, which
/// serializes the read-modify-write cycle per key. Lanes are async mutexes so
/// they may be held across the external collaborator calls a mutation makes.
#[derive(Debug, Default)]
pub struct SessionLanes {
    lanes: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLanes {
    /// Create an empty lane map
    pub fn new() -> Self {
        Self::default()
    }

    /// The lane for a session id, created on first use
    pub fn lane(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut lanes = self.lanes.lock();
        lanes
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the lane for a removed session
    pub fn forget(&self, id: &str) {
        self.lanes.lock().remove(id);
    }
}
