//! Deferred callback table.

use chirpbot_core::repository::TimerRepository;
use chirpbot_types::error::RepositoryError;
use chirpbot_types::timer::DeferredCallback;
use sqlx::Row;
use uuid::Uuid;

use super::store::{SqliteStore, from_json_opt, query_err, to_json};

struct TimerRow {
    id: String,
    module: String,
    inserted_at: i64,
    delay_ms: i64,
    data: Option<String>,
}

impl TimerRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            module: row.try_get("module")?,
            inserted_at: row.try_get("inserted_at")?,
            delay_ms: row.try_get("delay_ms")?,
            data: row.try_get("data")?,
        })
    }

    fn into_timer(self) -> Result<DeferredCallback, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid timer id: {e}")))?;

        Ok(DeferredCallback {
            id,
            module: self.module,
            inserted_at: self.inserted_at,
            delay_ms: self.delay_ms,
            data: from_json_opt(self.data)?,
        })
    }
}

impl TimerRepository for SqliteStore {
    async fn insert_timer(&self, timer: &DeferredCallback) -> Result<(), RepositoryError> {
        let data = timer.data.as_ref().map(to_json).transpose()?;

        sqlx::query(
            "INSERT INTO timers (id, module, inserted_at, delay_ms, data) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(timer.id.to_string())
        .bind(&timer.module)
        .bind(timer.inserted_at)
        .bind(timer.delay_ms)
        .bind(data)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn list_timers(&self) -> Result<Vec<DeferredCallback>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM timers ORDER BY seq")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| TimerRow::from_row(row).map_err(query_err)?.into_timer())
            .collect()
    }

    async fn take_timer(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM timers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected() == 1)
    }
}
