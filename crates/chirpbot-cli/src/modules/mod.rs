//! Behavior modules compiled into the binary.

mod ping;

use chirpbot_core::module::AgentModule;

use ping::PingModule;

/// Modules installed by `chirpbot run`, highest priority first.
pub fn builtin_modules() -> Vec<Box<dyn AgentModule>> {
    vec![Box::new(PingModule::default())]
}
