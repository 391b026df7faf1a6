//! Remote entities as delivered by the social network's API and stream.
//!
//! Field names follow the remote JSON (camelCase). Only the fields the
//! router and modules use are modelled; unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// `None` for accounts on the agent's own instance.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Flagged as an automated account.
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    /// `@username` or `@username@host` for remote users.
    pub fn acct(&self) -> String {
        match &self.host {
            Some(host) => format!("@{}@{}", self.username, host),
            None => format!("@{}", self.username),
        }
    }
}

/// A file stored in the remote drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
}

/// A public post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub user: User,
    /// May be absent even when the note has text; re-fetch before trusting it.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub renote_id: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub visibility: Option<String>,
}

/// A direct (messaging) message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub user: User,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file: Option<DriveFile>,
}

/// Notification kinds the agent reacts to; everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Reaction,
    Follow,
    Mention,
    Reply,
    Renote,
    Quote,
    #[serde(other)]
    Other,
}

/// An account notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub reaction: Option<String>,
    #[serde(default)]
    pub note: Option<Note>,
}

/// One event from the main stream channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Mention(Note),
    Reply(Note),
    Renote(Note),
    DirectMessage(DirectMessage),
    Notification(Notification),
}

impl StreamEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Mention(_) => "mention",
            StreamEvent::Reply(_) => "reply",
            StreamEvent::Renote(_) => "renote",
            StreamEvent::DirectMessage(_) => "direct-message",
            StreamEvent::Notification(_) => "notification",
        }
    }
}

/// Parameters for creating a note.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}
