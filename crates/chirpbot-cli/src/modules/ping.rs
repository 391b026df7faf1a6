//! Replies "pong" to any mention containing "ping".

use chirpbot_core::agent::AgentHandle;
use chirpbot_core::module::{AgentModule, HookSet};
use chirpbot_types::hook::{HandlerResult, HookOutcome};
use chirpbot_types::message::Message;

const TRIGGERS: &[&str] = &["ping"];

#[derive(Default)]
pub struct PingModule {
    agent: Option<AgentHandle>,
}

fn wants_pong(msg: &Message) -> bool {
    msg.includes(TRIGGERS)
}

impl AgentModule for PingModule {
    fn name(&self) -> &str {
        "ping"
    }

    fn init(&mut self, agent: AgentHandle) {
        self.agent = Some(agent);
    }

    fn install(&self) -> HookSet {
        let Some(agent) = self.agent.clone() else {
            return HookSet::new();
        };
        HookSet::new().mention(move |msg: Message| {
            let agent = agent.clone();
            async move {
                if !wants_pong(&msg) {
                    return Ok(HookOutcome::Pass);
                }
                agent.reply(&msg, "pong", None).await?;
                Ok(HookOutcome::Respond(HandlerResult::reaction("🏓").immediate()))
            }
        })
    }
}
