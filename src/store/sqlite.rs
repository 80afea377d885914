//! SQLite-backed message store
//!
//! rusqlite is synchronous, so the connection lives behind `Arc<Mutex>` and
//! every operation runs on the blocking thread pool, bounded by the
//! configured deadline.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::time::timeout;

use super::error::StoreError;
use super::{MessageRecord, MessageStore};

/// Default per-operation deadline
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS messages (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL
)";

/// Durable message store backed by a SQLite file
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    op_timeout: Duration,
}

impl SqliteStore {
    /// Open (or create) the database at `path` with the default deadline
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_timeout(path, DEFAULT_OP_TIMEOUT)
    }

    /// Open (or create) the database at `path` with a custom per-operation
    /// deadline
    pub fn open_with_timeout(
        path: impl AsRef<Path>,
        op_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;

        // WAL keeps history reads from blocking concurrent appends.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute(SCHEMA, [])?;

        tracing::info!(path = %path.as_ref().display(), "Message store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            op_timeout,
        })
    }

    /// Run a closure against the connection on the blocking pool, bounded by
    /// the operation deadline
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        let task = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Internal("store mutex poisoned".into()))?;
            op(&conn)
        });

        match timeout(self.op_timeout, task).await {
            Err(_) => Err(StoreError::Timeout),
            Ok(Err(join)) => Err(StoreError::Internal(join.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn append(&self, text: &str) -> Result<i64, StoreError> {
        let text = text.to_owned();

        self.run_blocking(move |conn| {
            conn.execute("INSERT INTO messages (text) VALUES (?1)", [&text])?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        self.run_blocking(|conn| {
            let mut stmt = conn.prepare("SELECT id, text FROM messages ORDER BY id ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok(MessageRecord {
                    id: row.get(0)?,
                    text: row.get(1)?,
                })
            })?;

            rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
        })
        .await
    }
}
