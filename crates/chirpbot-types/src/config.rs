//! Agent configuration types.
//!
//! `AgentConfig` represents `{data_dir}/config.toml`. Connection settings
//! (`host`, `token`) may be left out of the file and supplied from the command
//! line or environment instead; every tunable in [`AgentSettings`] has a
//! default.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct AgentConfig {
    /// Origin of the instance, e.g. `https://example.social`.
    #[serde(default)]
    pub host: Option<String>,

    /// Access token for the agent's account.
    #[serde(default)]
    pub token: Option<SecretString>,

    #[serde(flatten)]
    pub settings: AgentSettings,
}

impl AgentConfig {
    /// The configured host with any trailing slash removed.
    pub fn require_host(&self) -> Result<String, ConfigError> {
        self.host
            .as_deref()
            .map(|h| h.trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::Missing("host"))
    }

    pub fn require_token(&self) -> Result<&SecretString, ConfigError> {
        self.token.as_ref().ok_or(ConfigError::Missing("token"))
    }
}

/// Runtime tunables for routing, timers and bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    /// Reaction attached to handled public notes unless a hook overrides it.
    #[serde(default = "default_reaction")]
    pub default_reaction: String,

    /// Reaction attached to quote renotes of the agent's notes.
    #[serde(default = "default_reaction")]
    pub renote_reaction: String,

    /// Human-like pause before acknowledging a message.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Period of the deferred-callback sweeper.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Period of the liveness heartbeat written to process meta.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Total attempts for the startup account fetch.
    #[serde(default = "default_identity_fetch_attempts")]
    pub identity_fetch_attempts: u32,

    /// First backoff between account fetch attempts; doubles each retry.
    #[serde(default = "default_identity_retry_base_ms")]
    pub identity_retry_base_ms: u64,

    /// Affinity added when a user reacts to one of the agent's notes.
    #[serde(default = "default_affinity_increment")]
    pub affinity_increment: f64,

    /// SQLite file name inside the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_reaction() -> String {
    "love".to_string()
}

fn default_pacing_delay_ms() -> u64 {
    1_000
}

fn default_sweep_interval_ms() -> u64 {
    1_000
}

fn default_heartbeat_interval_ms() -> u64 {
    10_000
}

fn default_identity_fetch_attempts() -> u32 {
    3
}

fn default_identity_retry_base_ms() -> u64 {
    1_000
}

fn default_affinity_increment() -> f64 {
    0.1
}

fn default_database_file() -> String {
    "memory.db".to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            default_reaction: default_reaction(),
            renote_reaction: default_reaction(),
            pacing_delay_ms: default_pacing_delay_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            identity_fetch_attempts: default_identity_fetch_attempts(),
            identity_retry_base_ms: default_identity_retry_base_ms(),
            affinity_increment: default_affinity_increment(),
            database_file: default_database_file(),
        }
    }
}

impl AgentSettings {
    /// Reject values the runtime cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("sweep_interval_ms", self.sweep_interval_ms),
            ("heartbeat_interval_ms", self.heartbeat_interval_ms),
            ("identity_fetch_attempts", u64::from(self.identity_fetch_attempts)),
        ];
        for (setting, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    setting,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn identity_retry_base(&self) -> Duration {
        Duration::from_millis(self.identity_retry_base_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_settings_default_values() {
        let settings = AgentSettings::default();
        assert_eq!(settings.default_reaction, "love");
        assert_eq!(settings.pacing_delay(), Duration::from_secs(1));
        assert_eq!(settings.sweep_interval(), Duration::from_secs(1));
        assert_eq!(settings.heartbeat_interval(), Duration::from_secs(10));
        assert_eq!(settings.identity_fetch_attempts, 3);
        assert!((settings.affinity_increment - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_deserialize_empty_uses_defaults() {
        let config: AgentConfig = toml::from_str("").unwrap();
        assert!(config.host.is_none());
        assert!(config.token.is_none());
        assert_eq!(config.settings, AgentSettings::default());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
host = "https://example.social/"
token = "abc123"
default_reaction = "star"
pacing_delay_ms = 250
"#;
        let config: AgentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.require_host().unwrap(), "https://example.social");
        assert_eq!(config.require_token().unwrap().expose_secret(), "abc123");
        assert_eq!(config.settings.default_reaction, "star");
        assert_eq!(config.settings.pacing_delay_ms, 250);
        assert_eq!(config.settings.heartbeat_interval_ms, 10_000);
    }

    #[test]
    fn test_zero_periods_are_rejected() {
        assert!(AgentSettings::default().validate().is_ok());

        let config: AgentConfig = toml::from_str("sweep_interval_ms = 0").unwrap();
        assert!(matches!(
            config.settings.validate(),
            Err(ConfigError::Invalid { setting: "sweep_interval_ms", .. })
        ));

        let settings = AgentSettings {
            heartbeat_interval_ms: 0,
            ..AgentSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { setting: "heartbeat_interval_ms", .. })
        ));
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let config = AgentConfig::default();
        assert!(matches!(config.require_host(), Err(ConfigError::Missing("host"))));
        assert!(matches!(config.require_token(), Err(ConfigError::Missing("token"))));
    }
}
