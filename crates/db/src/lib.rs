//! SQLite store client for bookshelf.
//!
//! The [`Database`] handle is created once at process start, cloned into
//! whatever needs it, and closed explicitly at shutdown. Request handlers
//! never hold the pool directly; they check out a single connection per
//! request through [`Database::acquire`].

use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

pub mod error;
pub mod migrate;

pub use error::{StoreError, StoreResult};
pub use migrate::Migration;

/// Connection parameters for [`Database::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// In-memory databases live and die with their connection, so the pool
    /// must hold exactly one that never expires.
    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Pooled handle to the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `options`, creating the database file if needed.
    pub async fn connect(options: &ConnectOptions) -> StoreResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(&options.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if options.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(options.max_connections.max(1))
        };

        let pool = pool_options
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await?;

        tracing::info!(
            target: "bookshelf-db",
            url = %options.url,
            in_memory = options.is_in_memory(),
            "database pool opened"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and throwaway runs.
    pub async fn connect_in_memory() -> StoreResult<Self> {
        Self::connect(&ConnectOptions::new("sqlite::memory:")).await
    }

    /// Check out one connection. It goes back to the pool when dropped.
    pub async fn acquire(&self) -> StoreResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_database_keeps_state_across_acquires() {
        let db = Database::connect_in_memory().await.unwrap();

        {
            let mut conn = db.acquire().await.unwrap();
            sqlx::query("CREATE TABLE t (x INTEGER)")
                .execute(&mut *conn)
                .await
                .unwrap();
        }

        let mut conn = db.acquire().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn file_database_is_created_on_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let options = ConnectOptions::new(format!("sqlite://{}", path.display()));

        let db = Database::connect(&options).await.unwrap();
        assert!(path.exists());

        db.close().await;
        assert!(db.is_closed());
    }

    #[tokio::test]
    async fn unreachable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("books.db");
        let options = ConnectOptions::new(format!("sqlite://{}", path.display()));
        let err = Database::connect(&options).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlx(_)));
    }
}
