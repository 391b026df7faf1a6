//! SQLite connections for the agent's memory.
//!
//! Timer claims (`DELETE ... WHERE id = ?`) and affinity upserts must not
//! interleave, so every write goes through a one-connection pool. Lookups
//! use a separate read-only pool; WAL lets them proceed during a write.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

const READER_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only connections for list and find queries.
    pub reader: SqlitePool,
    /// The single connection all writes share.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the memory database at `database_url`, creating it and applying
    /// pending migrations first.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = connect_options(database_url)?;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        // Opened after migrating: a read-only connection cannot create the file.
        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }

    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT))
}

/// `sqlite://` URL for `file_name` inside `data_dir`.
pub fn database_url(data_dir: &Path, file_name: &str) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(file_name).display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path(), "test.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(
            table_names,
            vec!["contexts", "friends", "meta", "module_data", "timers"]
        );
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path(), "test_wal.db")).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_reopen_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path(), "reopen.db");

        let first = DatabasePool::new(&url).await.unwrap();
        first.close().await;

        let second = DatabasePool::new(&url).await.unwrap();
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timers")
            .fetch_one(&second.reader)
            .await
            .unwrap();
        assert_eq!(result.0, 0);
    }

    #[tokio::test]
    async fn test_writes_share_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path(), "single.db")).await.unwrap();

        assert_eq!(pool.writer.options().get_max_connections(), 1);
        let denied = sqlx::query("DELETE FROM timers").execute(&pool.reader).await;
        assert!(denied.is_err());
    }

    #[test]
    fn test_database_url() {
        let url = database_url(Path::new("/tmp/chirp"), "memory.db");
        assert_eq!(url, "sqlite:///tmp/chirp/memory.db?mode=rwc");
    }
}
