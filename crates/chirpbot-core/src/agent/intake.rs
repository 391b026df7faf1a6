//! Stream intake: turns raw stream events into dispatches.

use chirpbot_types::message::Message;
use chirpbot_types::note::{Note, Notification, NotificationKind, StreamEvent};
use tracing::{debug, warn};

use crate::agent::router::{Acknowledgment, DispatchError, EventRouter};

/// What intake did with one stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// Dropped by the intake rules.
    Ignored,
    /// Routed to the hooks.
    Dispatched(Acknowledgment),
    /// Renote acknowledged with a reaction.
    Reacted(String),
    /// Affinity credited to the user who reacted.
    AffinityCredited { user_id: String, affinity: f64 },
}

impl EventRouter {
    /// Process one stream event and log failures. Never fails.
    pub async fn handle_event(&self, event: StreamEvent) {
        let kind = event.kind();
        match self.process_event(event).await {
            Ok(outcome) => debug!(%kind, ?outcome, "stream event processed"),
            Err(e) => warn!(%kind, error = %e, "stream event dropped"),
        }
    }

    pub async fn process_event(&self, event: StreamEvent) -> Result<IntakeOutcome, DispatchError> {
        match event {
            StreamEvent::Mention(note) => {
                if self.is_own(&note) {
                    return Ok(IntakeOutcome::Ignored);
                }
                let note = self.with_text(note).await?;
                if !self.addresses_agent(&note) {
                    return Ok(IntakeOutcome::Ignored);
                }
                self.dispatch_note(note).await
            }
            StreamEvent::Reply(note) => {
                if self.is_own(&note) || self.addresses_agent(&note) {
                    return Ok(IntakeOutcome::Ignored);
                }
                let note = self.with_text(note).await?;
                self.dispatch_note(note).await
            }
            StreamEvent::Renote(note) => {
                if self.is_own(&note) || (note.text.is_none() && note.files.is_empty()) {
                    return Ok(IntakeOutcome::Ignored);
                }
                let reaction = self.settings.renote_reaction.clone();
                self.agent.api().create_reaction(&note.id, &reaction).await?;
                Ok(IntakeOutcome::Reacted(reaction))
            }
            StreamEvent::DirectMessage(dm) => {
                if dm.user_id == self.agent.account().id {
                    return Ok(IntakeOutcome::Ignored);
                }
                let ack = self.dispatch(Message::from_direct(dm)).await?;
                Ok(IntakeOutcome::Dispatched(ack))
            }
            StreamEvent::Notification(notification) => self.on_notification(notification).await,
        }
    }

    async fn on_notification(&self, notification: Notification) -> Result<IntakeOutcome, DispatchError> {
        match (notification.kind, notification.user) {
            (NotificationKind::Reaction, Some(user)) => {
                let record = self
                    .agent
                    .increment_affinity(&user, self.settings.affinity_increment)
                    .await?;
                Ok(IntakeOutcome::AffinityCredited {
                    user_id: record.user_id,
                    affinity: record.affinity,
                })
            }
            _ => Ok(IntakeOutcome::Ignored),
        }
    }

    async fn dispatch_note(&self, note: Note) -> Result<IntakeOutcome, DispatchError> {
        let ack = self.dispatch(Message::from_note(note)).await?;
        Ok(IntakeOutcome::Dispatched(ack))
    }

    fn is_own(&self, note: &Note) -> bool {
        note.user_id == self.agent.account().id
    }

    fn addresses_agent(&self, note: &Note) -> bool {
        let prefix = format!("@{}", self.agent.account().username);
        note.text.as_deref().is_some_and(|text| text.starts_with(&prefix))
    }

    /// Notes sometimes arrive with their text stripped; fetch the full note.
    async fn with_text(&self, note: Note) -> Result<Note, DispatchError> {
        if note.text.is_some() {
            return Ok(note);
        }
        debug!(note_id = %note.id, "note arrived without text, refetching");
        Ok(self.agent.show_note(&note.id).await?)
    }
}
