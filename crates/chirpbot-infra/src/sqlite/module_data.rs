//! Module-private JSON values, scoped by module name.

use chirpbot_core::repository::ModuleDataRepository;
use chirpbot_types::error::RepositoryError;
use chrono::Utc;
use sqlx::Row;

use super::store::{SqliteStore, format_datetime, from_json, query_err, to_json};

impl ModuleDataRepository for SqliteStore {
    async fn get_module_data(
        &self,
        module: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM module_data WHERE module = ? AND key = ?")
            .bind(module)
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value").map_err(query_err)?;
                Ok(Some(from_json(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn set_module_data(
        &self,
        module: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());

        sqlx::query(
            r#"INSERT INTO module_data (module, key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (module, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(module)
        .bind(key)
        .bind(to_json(value)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn delete_module_data(&self, module: &str, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM module_data WHERE module = ? AND key = ?")
            .bind(module)
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn list_module_keys(&self, module: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT key FROM module_data WHERE module = ? ORDER BY key")
            .bind(module)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(query_err))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::store::test_support::test_store;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_overwrite_delete() {
        let store = test_store().await;

        store.set_module_data("emoji", "last", &json!("🎉")).await.unwrap();
        store.set_module_data("emoji", "last", &json!("🌸")).await.unwrap();
        assert_eq!(
            store.get_module_data("emoji", "last").await.unwrap(),
            Some(json!("🌸"))
        );

        store.delete_module_data("emoji", "last").await.unwrap();
        assert!(store.get_module_data("emoji", "last").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_scoped_by_module() {
        let store = test_store().await;
        store.set_module_data("a", "z", &json!(1)).await.unwrap();
        store.set_module_data("a", "y", &json!(2)).await.unwrap();
        store.set_module_data("b", "x", &json!(3)).await.unwrap();

        assert_eq!(store.list_module_keys("a").await.unwrap(), vec!["y", "z"]);
        assert!(store.get_module_data("b", "y").await.unwrap().is_none());
    }
}
