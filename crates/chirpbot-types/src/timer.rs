//! Deferred callbacks: durable timers that survive restarts.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Payload;

/// A pending timer owned by a module.
///
/// Times are Unix epoch milliseconds so the expiry check stays a plain
/// integer comparison across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredCallback {
    pub id: Uuid,
    pub module: String,
    pub inserted_at: i64,
    pub delay_ms: i64,
    pub data: Option<Payload>,
}

impl DeferredCallback {
    pub fn new(module: impl Into<String>, delay_ms: i64, data: Option<Payload>) -> Self {
        Self {
            id: Uuid::now_v7(),
            module: module.into(),
            inserted_at: Utc::now().timestamp_millis(),
            delay_ms,
            data,
        }
    }

    pub fn due_at(&self) -> i64 {
        self.inserted_at.saturating_add(self.delay_ms)
    }

    /// Expired once `now - (inserted_at + delay) >= 0`.
    pub fn is_due(&self, now_ms: i64) -> bool {
        now_ms - self.due_at() >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_exactly_at_deadline() {
        let timer = DeferredCallback {
            id: Uuid::now_v7(),
            module: "reminder".to_string(),
            inserted_at: 1_000,
            delay_ms: 500,
            data: None,
        };
        assert!(!timer.is_due(1_499));
        assert!(timer.is_due(1_500));
        assert!(timer.is_due(9_999));
    }

    #[test]
    fn test_new_stamps_current_time() {
        let before = Utc::now().timestamp_millis();
        let timer = DeferredCallback::new("reminder", 0, None);
        assert!(timer.inserted_at >= before);
        assert!(timer.is_due(Utc::now().timestamp_millis()));
    }
}
