//! Event router.
//!
//! Resolves an inbound [`Message`] to exactly one of: the context hook of the
//! module owning the conversation, or the prioritized mention-hook chain.
//! After dispatch it paces, then acknowledges (reaction or read receipt).

use std::sync::Arc;

use chirpbot_types::config::AgentSettings;
use chirpbot_types::context::ContextTarget;
use chirpbot_types::error::{ApiError, HookError, RepositoryError};
use chirpbot_types::hook::HookOutcome;
use chirpbot_types::message::Message;
use tracing::{debug, warn};

use crate::agent::handle::AgentHandle;
use crate::module::HookRegistry;

/// Why a message was dropped before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OwnMessage,
    Bot,
}

/// The visible side effect of a completed dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgment {
    Skipped(SkipReason),
    /// Direct message marked as read.
    MarkedRead,
    /// Reaction attached to the source note.
    Reacted(String),
    /// Handled, but nothing sent: reaction suppressed or the ack call failed.
    Unacknowledged,
}

/// A dispatch that produced no response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

/// Acknowledgment settings resolved during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    reaction: String,
    immediate: bool,
}

impl Resolution {
    fn apply(&mut self, outcome: &HookOutcome) {
        if let HookOutcome::Respond(result) = outcome {
            if let Some(reaction) = &result.reaction {
                self.reaction = reaction.clone();
            }
            if let Some(immediate) = result.immediate {
                self.immediate = immediate;
            }
        }
    }
}

/// Routes messages to hooks. Cheap to clone; one clone per spawned dispatch.
#[derive(Clone)]
pub struct EventRouter {
    pub(crate) agent: AgentHandle,
    registry: Arc<HookRegistry>,
    pub(crate) settings: Arc<AgentSettings>,
}

impl EventRouter {
    pub fn new(agent: AgentHandle, registry: Arc<HookRegistry>, settings: Arc<AgentSettings>) -> Self {
        Self {
            agent,
            registry,
            settings,
        }
    }

    pub fn agent(&self) -> &AgentHandle {
        &self.agent
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Dispatch and log the outcome. Never fails.
    pub async fn handle_incoming(&self, msg: Message) {
        let id = msg.id.clone();
        match self.dispatch(msg).await {
            Ok(ack) => debug!(message_id = %id, ?ack, "message dispatched"),
            Err(e) => warn!(message_id = %id, error = %e, "dispatch failed, no response sent"),
        }
    }

    /// Route one message and return the acknowledgment that was emitted.
    ///
    /// A failing hook aborts the dispatch before pacing: nothing is
    /// acknowledged and stored contexts and timers are left as they are.
    pub async fn dispatch(&self, msg: Message) -> Result<Acknowledgment, DispatchError> {
        debug!(message_id = %msg.id, is_dm = msg.is_dm, "message received");

        if msg.user_id() == self.agent.account().id {
            return Ok(Acknowledgment::Skipped(SkipReason::OwnMessage));
        }
        if msg.user.is_bot {
            return Ok(Acknowledgment::Skipped(SkipReason::Bot));
        }

        let mut resolution = Resolution {
            reaction: self.settings.default_reaction.clone(),
            immediate: false,
        };

        let context = match ContextTarget::for_message(&msg) {
            Some(target) => self.agent.store().find_context(&target).await?,
            None => None,
        };

        let fall_through = match context {
            Some(context) => match self.registry.context_hook(&context.module) {
                Some(hook) => {
                    debug!(module = %context.module, key = ?context.key, "invoking context hook");
                    let outcome = hook(context.key.clone(), msg.clone(), context.data.clone())
                        .await
                        .map_err(|source| HookError::Failed {
                            module: context.module.clone(),
                            source,
                        })?;
                    resolution.apply(&outcome);
                    outcome == HookOutcome::Pass
                }
                None => {
                    warn!(module = %context.module, "context names a module without a context hook");
                    true
                }
            },
            None => true,
        };

        if fall_through {
            self.invoke_mention_hooks(&msg, &mut resolution).await?;
        }

        if !resolution.immediate {
            tokio::time::sleep(self.settings.pacing_delay()).await;
        }

        Ok(self.acknowledge(&msg, &resolution.reaction).await)
    }

    async fn invoke_mention_hooks(
        &self,
        msg: &Message,
        resolution: &mut Resolution,
    ) -> Result<(), HookError> {
        for (module, hook) in self.registry.mention_hooks() {
            let outcome = hook(msg.clone()).await.map_err(|source| HookError::Failed {
                module: module.clone(),
                source,
            })?;
            if outcome.is_definitive() {
                debug!(%module, "mention hook handled message");
                resolution.apply(&outcome);
                return Ok(());
            }
        }
        Ok(())
    }

    async fn acknowledge(&self, msg: &Message, reaction: &str) -> Acknowledgment {
        let api = self.agent.api();
        if msg.is_dm {
            match api.read_message(&msg.id).await {
                Ok(()) => Acknowledgment::MarkedRead,
                Err(e) => {
                    warn!(message_id = %msg.id, error = %e, "failed to mark message read");
                    Acknowledgment::Unacknowledged
                }
            }
        } else if reaction.is_empty() {
            Acknowledgment::Unacknowledged
        } else {
            match api.create_reaction(&msg.id, reaction).await {
                Ok(()) => Acknowledgment::Reacted(reaction.to_string()),
                Err(e) => {
                    warn!(note_id = %msg.id, error = %e, "failed to react");
                    Acknowledgment::Unacknowledged
                }
            }
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("agent", &self.agent)
            .field("registry", &self.registry)
            .finish()
    }
}
