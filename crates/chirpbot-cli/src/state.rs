//! Application state shared by the CLI commands.

use std::path::PathBuf;

use chirpbot_infra::config::{default_data_dir, load_agent_config};
use chirpbot_infra::sqlite::SqliteStore;
use chirpbot_infra::sqlite::pool::database_url;
use chirpbot_types::config::AgentConfig;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AgentConfig,
    pub store: SqliteStore,
}

impl AppState {
    /// Load `config.toml` and open the database inside `data_dir`
    /// (default `~/.chirpbot`), creating the directory if needed.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_agent_config(&data_dir).await?;
        let url = database_url(&data_dir, &config.settings.database_file);
        let store = SqliteStore::open(&url).await?;

        tracing::debug!(data_dir = %data_dir.display(), "state initialized");
        Ok(Self {
            data_dir,
            config,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_creates_database_in_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("nested");

        let state = AppState::init(Some(data_dir.clone())).await.unwrap();

        assert!(data_dir.join("memory.db").exists());
        assert_eq!(state.config.settings.default_reaction, "love");
        state.store.close().await;
    }

    #[tokio::test]
    async fn init_fails_on_malformed_config() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "host = [")
            .await
            .unwrap();

        assert!(AppState::init(Some(tmp.path().to_path_buf())).await.is_err());
    }
}
