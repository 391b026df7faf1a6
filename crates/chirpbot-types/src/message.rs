//! The uniform message abstraction handed to hooks.
//!
//! A `Message` is built once per inbound mention, reply or direct message and
//! never persisted.

use serde::Serialize;

use crate::note::{DirectMessage, DriveFile, Note, User};

/// An inbound message addressed to the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Note id for public posts, message id for direct messages.
    pub id: String,
    pub user: User,
    pub text: Option<String>,
    pub is_dm: bool,
    /// The note this one replies to, if any. Always `None` for direct messages.
    pub reply_id: Option<String>,
    pub files: Vec<DriveFile>,
}

impl Message {
    pub fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            user: note.user,
            text: note.text,
            is_dm: false,
            reply_id: note.reply_id,
            files: note.files,
        }
    }

    pub fn from_direct(dm: DirectMessage) -> Self {
        Self {
            id: dm.id,
            user: dm.user,
            text: dm.text,
            is_dm: true,
            reply_id: None,
            files: dm.file.into_iter().collect(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Message text, or the empty string when there is none.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Whether the text contains any of `words`, ignoring case.
    pub fn includes(&self, words: &[&str]) -> bool {
        let text = self.text().to_lowercase();
        words.iter().any(|w| text.contains(&w.to_lowercase()))
    }

    /// A message has no conversation context when it is a public note that
    /// does not reply to anything.
    pub fn is_no_context(&self) -> bool {
        !self.is_dm && self.reply_id.is_none()
    }
}
