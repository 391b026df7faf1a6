//! Conversation context table.

use chirpbot_core::repository::ContextRepository;
use chirpbot_types::Payload;
use chirpbot_types::context::{ContextTarget, ConversationContext};
use chirpbot_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::store::{SqliteStore, format_datetime, from_json_opt, parse_datetime, query_err, to_json};

struct ContextRow {
    id: String,
    is_dm: bool,
    target_id: String,
    module: String,
    key: Option<String>,
    data: Option<String>,
    created_at: String,
}

impl ContextRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            is_dm: row.try_get("is_dm")?,
            target_id: row.try_get("target_id")?,
            module: row.try_get("module")?,
            key: row.try_get("key")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_context(self) -> Result<ConversationContext, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid context id: {e}")))?;
        let data: Option<Payload> = from_json_opt(self.data)?;

        Ok(ConversationContext {
            id,
            target: ContextTarget::new(self.is_dm, self.target_id),
            module: self.module,
            key: self.key,
            data,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ContextRepository for SqliteStore {
    async fn insert_context(&self, context: &ConversationContext) -> Result<(), RepositoryError> {
        let data = context.data.as_ref().map(to_json).transpose()?;

        sqlx::query(
            r#"INSERT INTO contexts (id, is_dm, target_id, module, key, data, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(context.id.to_string())
        .bind(context.target.is_dm())
        .bind(context.target.id())
        .bind(&context.module)
        .bind(&context.key)
        .bind(data)
        .bind(format_datetime(&context.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn find_context(
        &self,
        target: &ContextTarget,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM contexts WHERE is_dm = ? AND target_id = ? ORDER BY seq LIMIT 1",
        )
        .bind(target.is_dm())
        .bind(target.id())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        row.map(|row| ContextRow::from_row(&row).map_err(query_err)?.into_context())
            .transpose()
    }

    async fn remove_contexts(&self, module: &str, key: Option<&str>) -> Result<u64, RepositoryError> {
        // `IS` so a NULL key matches only NULL keys.
        let result = sqlx::query("DELETE FROM contexts WHERE module = ? AND key IS ?")
            .bind(module)
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected())
    }

    async fn list_contexts(&self) -> Result<Vec<ConversationContext>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM contexts ORDER BY seq")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| ContextRow::from_row(row).map_err(query_err)?.into_context())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::store::test_support::test_store;
    use serde_json::json;

    fn context(module: &str, key: Option<&str>, is_dm: bool, id: &str) -> ConversationContext {
        ConversationContext::new(module, key.map(str::to_string), ContextTarget::new(is_dm, id), None)
    }

    #[tokio::test]
    async fn test_insert_and_find_roundtrip() {
        let store = test_store().await;
        let mut ctx = context("quiz", Some("q1"), false, "n1");
        ctx.data = Some(json!({"answer": 42}));
        store.insert_context(&ctx).await.unwrap();

        let found = store
            .find_context(&ContextTarget::Note("n1".into()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, ctx.id);
        assert_eq!(found.key.as_deref(), Some("q1"));
        assert_eq!(found.data, Some(json!({"answer": 42})));
    }

    #[tokio::test]
    async fn test_direct_and_note_targets_are_distinct() {
        let store = test_store().await;
        store.insert_context(&context("quiz", None, true, "same")).await.unwrap();

        assert!(store.find_context(&ContextTarget::Note("same".into())).await.unwrap().is_none());
        assert!(store.find_context(&ContextTarget::Direct("same".into())).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicates_return_oldest() {
        let store = test_store().await;
        store.insert_context(&context("first", None, false, "n1")).await.unwrap();
        store.insert_context(&context("second", None, false, "n1")).await.unwrap();

        let found = store
            .find_context(&ContextTarget::Note("n1".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.module, "first");
    }

    #[tokio::test]
    async fn test_remove_by_module_and_key() {
        let store = test_store().await;
        store.insert_context(&context("quiz", Some("k"), false, "n1")).await.unwrap();
        store.insert_context(&context("quiz", Some("k"), true, "u1")).await.unwrap();
        store.insert_context(&context("quiz", None, false, "n2")).await.unwrap();
        store.insert_context(&context("other", Some("k"), false, "n3")).await.unwrap();

        assert_eq!(store.remove_contexts("quiz", Some("k")).await.unwrap(), 2);
        assert_eq!(store.remove_contexts("quiz", None).await.unwrap(), 1);

        let left = store.list_contexts().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].module, "other");
    }
}
