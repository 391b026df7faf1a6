//! Per-user affinity ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::note::User;

/// Affinity towards one remote user. Created lazily, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityRecord {
    pub user_id: String,
    /// Last seen profile snapshot, if one was observed.
    pub user: Option<User>,
    pub affinity: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
