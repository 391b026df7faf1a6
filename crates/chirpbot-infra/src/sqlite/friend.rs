//! Affinity ledger table.

use chirpbot_core::repository::FriendRepository;
use chirpbot_types::error::RepositoryError;
use chirpbot_types::friend::AffinityRecord;
use chirpbot_types::note::User;
use chrono::Utc;
use sqlx::Row;

use super::store::{SqliteStore, format_datetime, from_json_opt, parse_datetime, query_err, to_json};

struct FriendRow {
    user_id: String,
    user: Option<String>,
    affinity: f64,
    created_at: String,
    updated_at: String,
}

impl FriendRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            user: row.try_get("user")?,
            affinity: row.try_get("affinity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<AffinityRecord, RepositoryError> {
        Ok(AffinityRecord {
            user_id: self.user_id,
            user: from_json_opt(self.user)?,
            affinity: self.affinity,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl FriendRepository for SqliteStore {
    async fn find_friend(&self, user_id: &str) -> Result<Option<AffinityRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM friends WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|row| FriendRow::from_row(&row).map_err(query_err)?.into_record())
            .transpose()
    }

    async fn add_affinity(
        &self,
        user_id: &str,
        user: Option<&User>,
        amount: f64,
    ) -> Result<AffinityRecord, RepositoryError> {
        let now = format_datetime(&Utc::now());
        let user_json = user.map(to_json).transpose()?;

        // Single upsert on the writer: creation at 0 and the increment are one statement.
        let row = sqlx::query(
            r#"INSERT INTO friends (user_id, user, affinity, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (user_id) DO UPDATE SET
                   affinity = friends.affinity + excluded.affinity,
                   user = COALESCE(excluded.user, friends.user),
                   updated_at = excluded.updated_at
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(user_json)
        .bind(amount)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_err)?;

        FriendRow::from_row(&row).map_err(query_err)?.into_record()
    }

    async fn list_friends(&self) -> Result<Vec<AffinityRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM friends ORDER BY affinity DESC, user_id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| FriendRow::from_row(row).map_err(query_err)?.into_record())
            .collect()
    }
}
