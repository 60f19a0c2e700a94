use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use canopy_types::{PayloadDigest, TreeId};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension};

use crate::error::{StoreError, StoreResult};
use crate::traits::TreeStore;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS trees (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL UNIQUE
)";

const INSERT_PAYLOAD: &str = "INSERT INTO trees (payload) VALUES (?1)";
const SELECT_ID_BY_PAYLOAD: &str = "SELECT id FROM trees WHERE payload = ?1";
const SELECT_PAYLOAD_BY_ID: &str = "SELECT payload FROM trees WHERE id = ?1";
const COUNT_TREES: &str = "SELECT COUNT(*) FROM trees";

/// SQLite-backed tree store.
///
/// Owns a single connection. The connection and its prepared statements are
/// not safe to use from several threads at once, so every operation runs
/// inside one mutex; the connection itself is never handed out.
pub struct SqliteTreeStore {
    location: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteTreeStore {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// Fails if the file cannot be opened, the schema cannot be created, or
    /// any of the statements cannot be prepared. Callers are expected to
    /// treat these failures as fatal.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let location = path.as_ref().to_path_buf();
        let conn = Connection::open(&location).map_err(|source| StoreError::Open {
            path: location.clone(),
            source,
        })?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(StoreError::Schema)?;
        Self::with_connection(location, conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let location = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: location.clone(),
            source,
        })?;
        Self::with_connection(location, conn)
    }

    fn with_connection(location: PathBuf, conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA).map_err(StoreError::Schema)?;
        // Prepare everything up front so a broken schema fails at startup;
        // the statements stay in the connection's cache for later calls.
        for sql in [INSERT_PAYLOAD, SELECT_ID_BY_PAYLOAD, SELECT_PAYLOAD_BY_ID, COUNT_TREES] {
            conn.prepare_cached(sql).map_err(StoreError::Schema)?;
        }
        tracing::debug!(location = %location.display(), "opened tree database");
        Ok(Self {
            location,
            conn: Mutex::new(conn),
        })
    }

    /// Where the database lives (`:memory:` for in-memory stores).
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Number of trees stored.
    pub fn len(&self) -> StoreResult<usize> {
        let conn = self.lock();
        let mut count = conn
            .prepare_cached(COUNT_TREES)
            .map_err(|e| internal("count", COUNT_TREES, e))?;
        count
            .query_row([], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| internal("count", COUNT_TREES, e))
    }

    /// Returns `true` if no tree has been stored yet.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }

    // A panic inside the critical section leaves SQLite itself consistent,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TreeStore for SqliteTreeStore {
    fn insert(&self, payload: &str) -> StoreResult<TreeId> {
        let conn = self.lock();
        let mut insert = conn
            .prepare_cached(INSERT_PAYLOAD)
            .map_err(|e| internal("insert", INSERT_PAYLOAD, e))?;
        match insert.execute(params![payload]) {
            Ok(_) => {
                let id = TreeId::new(conn.last_insert_rowid());
                tracing::debug!(
                    %id,
                    digest = %PayloadDigest::of(payload).short_hex(),
                    bytes = payload.len(),
                    "stored tree"
                );
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => {
                let mut select = conn
                    .prepare_cached(SELECT_ID_BY_PAYLOAD)
                    .map_err(|e| internal("insert", SELECT_ID_BY_PAYLOAD, e))?;
                let id = select
                    .query_row(params![payload], |row| row.get::<_, i64>(0))
                    .map(TreeId::new)
                    .map_err(|e| internal("insert", SELECT_ID_BY_PAYLOAD, e))?;
                tracing::debug!(%id, "tree already stored");
                Ok(id)
            }
            Err(err) => Err(internal("insert", INSERT_PAYLOAD, err)),
        }
    }

    fn select(&self, id: TreeId) -> StoreResult<String> {
        let conn = self.lock();
        let mut select = conn
            .prepare_cached(SELECT_PAYLOAD_BY_ID)
            .map_err(|e| internal("select", SELECT_PAYLOAD_BY_ID, e))?;
        select
            .query_row(params![id.get()], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|e| internal("select", SELECT_PAYLOAD_BY_ID, e))?
            .ok_or(StoreError::NotFound(id))
    }
}

impl std::fmt::Debug for SqliteTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTreeStore")
            .field("location", &self.location)
            .finish()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == ErrorCode::ConstraintViolation
                && code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Log the full engine diagnostic and return the opaque error.
fn internal(operation: &'static str, statement: &'static str, err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(code, message) => tracing::error!(
            operation,
            statement,
            code = ?code.code,
            extended_code = code.extended_code,
            message = message.as_deref().unwrap_or_default(),
            "tree database query failed"
        ),
        other => tracing::error!(operation, statement, error = %other, "tree database query failed"),
    }
    StoreError::Internal { operation }
}
