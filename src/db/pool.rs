//! SQLite Connection Pool
//!
//! Bounded pool of `rusqlite` connections for async handlers:
//! - a semaphore caps checked-out connections at `max_size`
//! - acquisition waits at most `acquire_timeout`, then fails with a retryable error
//! - queries run on the blocking thread pool
//! - connections go back to the idle list from a drop guard, so errors and panics never leak them

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

/// Pool sizing and wait policy
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: usize,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Database errors
#[derive(Debug)]
pub enum DbError {
    /// No connection became free within the wait policy. Safe to retry.
    PoolTimeout,
    PoolClosed,
    Sqlite(rusqlite::Error),
    /// The blocking worker panicked or was cancelled.
    Worker(String),
}

impl DbError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::PoolTimeout | DbError::Worker(_))
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::PoolTimeout => write!(f, "Timed out waiting for a database connection"),
            DbError::PoolClosed => write!(f, "Database pool is closed"),
            DbError::Sqlite(e) => write!(f, "SQLite error: {}", e),
            DbError::Worker(e) => write!(f, "Database worker failed: {}", e),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        DbError::Sqlite(e)
    }
}

struct PoolInner {
    db_path: String,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    config: PoolConfig,
}

/// Shared, cloneable handle to the pool
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<PoolInner>,
}

/// A checked-out connection. Returns itself to the idle list on drop.
struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.idle.lock().push(conn);
        }
    }
}

impl DbPool {
    /// Open the pool. One connection is opened eagerly so a bad path fails at startup.
    pub fn open(db_path: &str, config: PoolConfig) -> Result<Self, DbError> {
        let max_size = config.max_size.max(1);
        let first = open_connection(db_path)?;

        debug!(
            "Opened SQLite pool at {} (max {} connections, wait {:?})",
            db_path, max_size, config.acquire_timeout
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path: db_path.to_string(),
                idle: Mutex::new(vec![first]),
                permits: Arc::new(Semaphore::new(max_size)),
                config: PoolConfig {
                    max_size,
                    ..config
                },
            }),
        })
    }

    /// Connections currently idle in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Connections that could be checked out right now.
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Stop handing out connections. Waiters fail with `PoolClosed`.
    pub fn close(&self) {
        self.inner.permits.close();
        self.inner.idle.lock().clear();
    }

    async fn acquire(&self) -> Result<PooledConnection, DbError> {
        let permit = tokio::time::timeout(
            self.inner.config.acquire_timeout,
            self.inner.permits.clone().acquire_owned(),
        )
        .await
        .map_err(|_| {
            warn!(
                "Database pool exhausted ({} connections busy for {:?})",
                self.inner.config.max_size, self.inner.config.acquire_timeout
            );
            DbError::PoolTimeout
        })?
        .map_err(|_| DbError::PoolClosed)?;

        let idle = self.inner.idle.lock().pop();
        let conn = match idle {
            Some(conn) => conn,
            None => open_connection(&self.inner.db_path)?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Run `f` against a pooled connection on the blocking thread pool.
    pub async fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pooled = self.acquire().await?;

        tokio::task::spawn_blocking(move || {
            let pooled = pooled;
            match pooled.conn.as_ref() {
                Some(conn) => f(conn).map_err(DbError::from),
                None => Err(DbError::PoolClosed),
            }
        })
        .await
        .map_err(|e| DbError::Worker(e.to_string()))?
    }
}

fn open_connection(db_path: &str) -> Result<Connection, DbError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX; // one thread per checked-out connection

    let conn = Connection::open_with_flags(db_path, flags)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}
