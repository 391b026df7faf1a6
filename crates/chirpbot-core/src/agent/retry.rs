//! Bounded retry for the startup identity fetch.

use std::time::Duration;

use chirpbot_types::error::{ApiError, StartupError};
use chirpbot_types::note::User;
use tracing::{info, warn};

use crate::api::BoxSocialApi;

/// Fetch the agent's own account, trying up to `attempts` times with
/// exponential backoff starting at `base_delay`.
///
/// Exhausting the attempts is a startup failure.
pub async fn fetch_identity(
    api: &BoxSocialApi,
    attempts: u32,
    base_delay: Duration,
) -> Result<User, StartupError> {
    let attempts = attempts.max(1);
    let mut last_error = ApiError::Http("identity fetch never attempted".to_string());

    for attempt in 1..=attempts {
        match api.fetch_self().await {
            Ok(account) => {
                info!(account = %account.acct(), attempt, "account fetched");
                return Ok(account);
            }
            Err(e) => {
                warn!(attempt, max = attempts, error = %e, "failed to fetch account");
                last_error = e;
                if attempt < attempts {
                    tokio::time::sleep(backoff_delay(base_delay, attempt)).await;
                }
            }
        }
    }

    Err(StartupError::IdentityFetch {
        attempts,
        source: last_error,
    })
}

/// `base * 2^(attempt - 1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
