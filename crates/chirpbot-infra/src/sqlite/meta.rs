//! Process meta singleton.

use std::collections::BTreeMap;

use chirpbot_core::repository::MetaRepository;
use chirpbot_types::error::RepositoryError;
use chirpbot_types::meta::{MetaValue, ProcessMeta};
use sqlx::Row;

use super::store::{SqliteStore, from_json, query_err, to_json};

impl MetaRepository for SqliteStore {
    async fn load_meta(&self) -> Result<Option<ProcessMeta>, RepositoryError> {
        let row = sqlx::query("SELECT last_waking_at, fields FROM meta WHERE id = 1")
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let last_waking_at: i64 = row.try_get("last_waking_at").map_err(query_err)?;
        let fields: String = row.try_get("fields").map_err(query_err)?;
        let fields: BTreeMap<String, MetaValue> = from_json(&fields)?;

        Ok(Some(ProcessMeta {
            last_waking_at,
            fields,
        }))
    }

    async fn save_meta(&self, meta: &ProcessMeta) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO meta (id, last_waking_at, fields) VALUES (1, ?, ?)
               ON CONFLICT (id) DO UPDATE SET
                   last_waking_at = excluded.last_waking_at,
                   fields = excluded.fields"#,
        )
        .bind(meta.last_waking_at)
        .bind(to_json(&meta.fields)?)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }
}
