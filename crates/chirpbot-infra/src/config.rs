//! Configuration loader for chirpbot.
//!
//! Reads `config.toml` from the data directory (`~/.chirpbot/` by default)
//! into [`AgentConfig`]. A missing file yields defaults; a malformed one is
//! an error, since the agent cannot run on a half-read configuration.

use std::path::{Path, PathBuf};

use chirpbot_types::config::AgentConfig;
use chirpbot_types::error::ConfigError;
use secrecy::SecretString;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// `~/.chirpbot`, or `./.chirpbot` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chirpbot")
}

/// Load `{data_dir}/config.toml`.
pub async fn load_agent_config(data_dir: &Path) -> Result<AgentConfig, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(AgentConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AgentConfig>(&content).map_err(|err| ConfigError::Parse {
        path: config_path.display().to_string(),
        reason: err.to_string(),
    })?;
    config.settings.validate()?;
    Ok(config)
}

/// Replace the file's connection settings with ones given on the command
/// line or in the environment.
pub fn apply_overrides(
    mut config: AgentConfig,
    host: Option<String>,
    token: Option<SecretString>,
) -> AgentConfig {
    if host.is_some() {
        config.host = host;
    }
    if token.is_some() {
        config.token = token;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_agent_config(tmp.path()).await.unwrap();
        assert!(config.host.is_none());
        assert_eq!(config.settings.default_reaction, "love");
        assert_eq!(config.settings.sweep_interval_ms, 1000);
    }

    #[tokio::test]
    async fn load_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
host = "https://example.social/"
token = "abc123"
default_reaction = "star"
pacing_delay_ms = 250
"#,
        )
        .await
        .unwrap();

        let config = load_agent_config(tmp.path()).await.unwrap();
        assert_eq!(config.require_host().unwrap(), "https://example.social");
        assert_eq!(config.require_token().unwrap().expose_secret(), "abc123");
        assert_eq!(config.settings.default_reaction, "star");
        assert_eq!(config.settings.pacing_delay_ms, 250);
        assert_eq!(config.settings.heartbeat_interval_ms, 10_000);
    }

    #[tokio::test]
    async fn load_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = load_agent_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_zero_sweep_interval_is_an_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "sweep_interval_ms = 0\n")
            .await
            .unwrap();

        let err = load_agent_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { setting: "sweep_interval_ms", .. }));
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = AgentConfig {
            host: Some("https://file.example".into()),
            ..AgentConfig::default()
        };

        let config = apply_overrides(config, None, Some(SecretString::from("cli-token")));

        assert_eq!(config.host.as_deref(), Some("https://file.example"));
        assert_eq!(config.require_token().unwrap().expose_secret(), "cli-token");
    }

    #[test]
    fn default_data_dir_ends_with_chirpbot() {
        assert!(default_data_dir().ends_with(".chirpbot"));
    }
}
