//! Process meta: the singleton bookkeeping record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scalar value stored in process meta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

/// Singleton record holding the last heartbeat and arbitrary scalar fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessMeta {
    /// Unix epoch milliseconds of the last heartbeat.
    pub last_waking_at: i64,
    #[serde(default)]
    pub fields: BTreeMap<String, MetaValue>,
}

impl ProcessMeta {
    pub fn new(last_waking_at: i64) -> Self {
        Self {
            last_waking_at,
            fields: BTreeMap::new(),
        }
    }

    /// Merge `patch` into this record. Fields absent from the patch are kept.
    pub fn merge(&mut self, patch: MetaPatch) {
        if let Some(at) = patch.last_waking_at {
            self.last_waking_at = at;
        }
        self.fields.extend(patch.fields);
    }
}

/// Partial update for [`ProcessMeta`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaPatch {
    pub last_waking_at: Option<i64>,
    pub fields: BTreeMap<String, MetaValue>,
}

impl MetaPatch {
    pub fn waking_at(at: i64) -> Self {
        Self {
            last_waking_at: Some(at),
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: MetaValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}
