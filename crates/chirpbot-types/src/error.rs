use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chirpbot-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from the remote social API (request/response calls and the stream).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Errors raised while loading the agent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid setting '{setting}': {reason}")]
    Invalid {
        setting: &'static str,
        reason: String,
    },
}

/// Fatal errors that stop the agent before it starts routing events.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to fetch own account after {attempts} attempts: {source}")]
    IdentityFetch {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("failed to load the memory: {0}")]
    Store(#[from] RepositoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A behavior module's hook or callback failed.
///
/// Carries the module name so the operator can tell which module misbehaved.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("module '{module}' failed: {source}")]
    Failed {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no timeout callback registered for module '{0}'")]
    NoTimeoutCallback(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_invalid_setting_display() {
        let err = ConfigError::Invalid {
            setting: "sweep_interval_ms",
            reason: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid setting 'sweep_interval_ms': must be greater than zero"
        );
    }

    #[test]
    fn test_api_status_error_display() {
        let err = ApiError::Status {
            endpoint: "notes/show".to_string(),
            status: 404,
            body: "NO_SUCH_NOTE".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("notes/show"));
    }

    #[test]
    fn test_startup_error_wraps_api_error() {
        let err = StartupError::IdentityFetch {
            attempts: 3,
            source: ApiError::Http("connection refused".to_string()),
        };
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[test]
    fn test_hook_error_names_module() {
        let err = HookError::Failed {
            module: "emoji-maker".to_string(),
            source: anyhow::anyhow!("render failed"),
        };
        assert_eq!(err.to_string(), "module 'emoji-maker' failed: render failed");
    }
}
