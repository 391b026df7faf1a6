//! Dispatch-and-memory core for chirpbot.
//!
//! This crate defines the "ports" (store and social API traits) that the
//! infrastructure layer implements, plus everything with ordering semantics:
//! the hook registry, the event router, the deferred-callback sweeper and the
//! heartbeat. It depends only on `chirpbot-types` -- never on `chirpbot-infra`
//! or any database/IO crate.

pub mod agent;
pub mod api;
pub mod module;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
