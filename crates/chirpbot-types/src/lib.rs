//! Shared domain types for chirpbot.
//!
//! This crate contains the types that flow between the event router, the
//! persistent memory and the behavior modules: inbound notes and messages,
//! conversation contexts, deferred callbacks, affinity records, process meta,
//! hook results and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod context;
pub mod error;
pub mod friend;
pub mod hook;
pub mod message;
pub mod meta;
pub mod note;
pub mod timer;

/// Opaque module-owned value attached to contexts and timers.
///
/// The router stores and hands it back verbatim; only the owning module
/// interprets its contents.
pub type Payload = serde_json::Value;
