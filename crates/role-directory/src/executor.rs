//! Async SQLite executor using a dedicated background thread.
//!
//! - One thread owns the SQLite connection; queries reach it over a channel
//! - Callers await results without blocking the Tokio runtime
//! - Work executes in FIFO order, which also serializes writers
//!
//! Only SQL and lightweight row mapping belong inside [`AsyncDatabase::call`].
//!
//! [`AsyncDatabase::call_timeout`] bounds a call. Work still queued at the
//! deadline is skipped; work already running is interrupted and rolls back.
//!
//! ```ignore
//! let db = AsyncDatabase::open(path).await?;
//! let names = db.call(|conn| queries::list_role_names(conn)).await?;
//! ```

use crate::{migrations, StorageError, StorageResult};
use parking_lot::Mutex;
use rusqlite::InterruptHandle;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

const FILE_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA foreign_keys = ON;
    PRAGMA cache_size = -16000;
    PRAGMA busy_timeout = 5000;
";

// WAL does not apply to in-memory databases.
const MEMORY_PRAGMAS: &str = "
    PRAGMA foreign_keys = ON;
";

fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> StorageError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => StorageError::Sqlite(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            StorageError::Connection("Connection closed".to_string())
        }
        other => StorageError::Connection(other.to_string()),
    }
}

/// Progress of one bounded call, shared between the caller and the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Queued,
    Running,
    Interrupted,
    Abandoned,
    Finished,
}

/// Async SQLite database with a dedicated executor thread.
#[derive(Clone)]
pub struct AsyncDatabase {
    conn: Connection,
    interrupt: Arc<InterruptHandle>,
    path: String,
}

impl AsyncDatabase {
    /// Open a database file, creating it and its parent directory if needed,
    /// then apply pragmas and pending migrations.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening role database");

        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::initialize(conn, path_str, FILE_PRAGMAS).await
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::initialize(conn, ":memory:".to_string(), MEMORY_PRAGMAS).await
    }

    async fn initialize(
        conn: Connection,
        path: String,
        pragmas: &'static str,
    ) -> StorageResult<Self> {
        conn.call(move |conn| {
            conn.execute_batch(pragmas)?;
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)?;

        let interrupt = conn
            .call(|conn| Ok(conn.get_interrupt_handle()))
            .await
            .map_err(from_tokio_rusqlite)?;

        let db = Self {
            conn,
            interrupt: Arc::new(interrupt),
            path,
        };
        db.call(|conn| migrations::run_migrations(conn)).await?;

        info!(path = %db.path, "Role database initialized");
        Ok(db)
    }

    /// Execute a closure on the connection, on the dedicated SQLite thread.
    ///
    /// The closure's own error type is preserved; executor failures (closed
    /// connection, dead thread) convert into it through `From<StorageError>`.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
    {
        // The closure's result rides inside tokio_rusqlite's Ok variant so that
        // domain errors are not flattened into rusqlite errors.
        let outer = self.conn.call(move |conn| Ok(f(conn))).await;

        match outer {
            Ok(inner) => inner,
            Err(e) => Err(E::from(from_tokio_rusqlite(e))),
        }
    }

    /// Like [`call`](Self::call), but gives up after `timeout`.
    ///
    /// A closure still queued at the deadline never touches the connection.
    /// A closure already running is interrupted; if it then fails, its
    /// transaction has rolled back and the caller sees
    /// [`StorageError::Timeout`]. If it committed before the interrupt landed,
    /// the caller sees its real result.
    pub async fn call_timeout<F, T, E>(&self, timeout: Duration, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(CallState::Queued));
        let worker = Arc::clone(&slot);

        let call = self.call(move |conn| {
            {
                let mut state = worker.lock();
                if *state == CallState::Abandoned {
                    return Err(E::from(StorageError::Timeout(timeout)));
                }
                *state = CallState::Running;
            }

            let result = f(conn);

            // Finishing under the lock keeps a late interrupt off the next call.
            let mut state = worker.lock();
            let interrupted = *state == CallState::Interrupted;
            *state = CallState::Finished;
            match result {
                Err(_) if interrupted => Err(E::from(StorageError::Timeout(timeout))),
                other => other,
            }
        });
        tokio::pin!(call);

        if let Ok(result) = tokio::time::timeout(timeout, &mut call).await {
            return result;
        }

        {
            let mut state = slot.lock();
            let current = *state;
            match current {
                CallState::Queued => {
                    *state = CallState::Abandoned;
                    warn!(?timeout, "Queued database call abandoned");
                    return Err(E::from(StorageError::Timeout(timeout)));
                }
                CallState::Running => {
                    *state = CallState::Interrupted;
                    self.interrupt.interrupt();
                    warn!(?timeout, "Running database call interrupted");
                }
                _ => {}
            }
        }

        call.await
    }

    /// Get the database file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check that the executor answers a trivial query within `timeout`.
    pub async fn health_check(&self, timeout: Duration) -> StorageResult<()> {
        self.call_timeout(timeout, |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok::<_, StorageError>(())
        })
        .await?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Close the connection after pending work drains and stop the executor thread.
    pub async fn close(self) -> StorageResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to close database: {}", e)))?;
        info!(path = %self.path, "Role database closed");
        Ok(())
    }
}
