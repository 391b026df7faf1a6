//! Conversation contexts: a conversation identity bound to the module that
//! is waiting for the next reply in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Payload;
use crate::message::Message;

/// Identity of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContextTarget {
    /// A direct-message conversation with this peer user id.
    Direct(String),
    /// Replies to this note id.
    Note(String),
}

impl ContextTarget {
    pub fn new(is_dm: bool, id: impl Into<String>) -> Self {
        if is_dm {
            ContextTarget::Direct(id.into())
        } else {
            ContextTarget::Note(id.into())
        }
    }

    /// The target a message would resume, or `None` for a no-context message.
    pub fn for_message(msg: &Message) -> Option<Self> {
        if msg.is_no_context() {
            return None;
        }
        if msg.is_dm {
            Some(ContextTarget::Direct(msg.user.id.clone()))
        } else {
            msg.reply_id.clone().map(ContextTarget::Note)
        }
    }

    pub fn is_dm(&self) -> bool {
        matches!(self, ContextTarget::Direct(_))
    }

    pub fn id(&self) -> &str {
        match self {
            ContextTarget::Direct(id) | ContextTarget::Note(id) => id,
        }
    }
}

/// A durable "waiting for a reply" record owned by a module.
///
/// Several rows may exist for one target; lookups return the oldest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub id: Uuid,
    pub target: ContextTarget,
    pub module: String,
    /// Module-defined continuation key.
    pub key: Option<String>,
    pub data: Option<Payload>,
    pub created_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(
        module: impl Into<String>,
        key: Option<String>,
        target: ContextTarget,
        data: Option<Payload>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            target,
            module: module.into(),
            key,
            data,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_new_picks_variant() {
        assert_eq!(ContextTarget::new(true, "u1"), ContextTarget::Direct("u1".into()));
        assert_eq!(ContextTarget::new(false, "n1"), ContextTarget::Note("n1".into()));
        assert!(ContextTarget::new(true, "u1").is_dm());
        assert_eq!(ContextTarget::new(false, "n1").id(), "n1");
    }

    #[test]
    fn test_target_for_message() {
        let user = crate::note::User {
            id: "u1".into(),
            username: "alice".into(),
            host: None,
            name: None,
            is_bot: false,
        };
        let mut msg = Message {
            id: "n2".into(),
            user,
            text: Some("hi".into()),
            is_dm: false,
            reply_id: None,
            files: vec![],
        };
        assert_eq!(ContextTarget::for_message(&msg), None);

        msg.reply_id = Some("n1".into());
        assert_eq!(ContextTarget::for_message(&msg), Some(ContextTarget::Note("n1".into())));

        msg.is_dm = true;
        msg.reply_id = None;
        assert_eq!(ContextTarget::for_message(&msg), Some(ContextTarget::Direct("u1".into())));
    }

    #[test]
    fn test_target_serializes_tagged() {
        let json = serde_json::to_string(&ContextTarget::Note("n9".into())).unwrap();
        assert_eq!(json, r#"{"kind":"note","id":"n9"}"#);
    }
}
