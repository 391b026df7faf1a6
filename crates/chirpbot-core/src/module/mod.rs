//! Behavior module contract and hook types.
//!
//! A module is any value exposing a stable `name`, an `init` that receives
//! the agent handle, and an `install` that returns the hooks it contributes.
//! Hooks are plain closures: whatever state they need is captured explicitly
//! when `install` builds them.

pub mod registry;

pub use registry::HookRegistry;

use std::future::Future;
use std::sync::Arc;

use chirpbot_types::Payload;
use chirpbot_types::hook::HookOutcome;
use chirpbot_types::message::Message;
use futures_util::future::BoxFuture;

use crate::agent::AgentHandle;

/// Future returned by every hook.
pub type HookFuture<T> = BoxFuture<'static, anyhow::Result<T>>;

/// Stateless handler tried against messages without an active context.
pub type MentionHook = Arc<dyn Fn(Message) -> HookFuture<HookOutcome> + Send + Sync>;

/// Handler invoked with `(continuation key, message, payload)` when a
/// context owned by the module matches an inbound message.
pub type ContextHook =
    Arc<dyn Fn(Option<String>, Message, Option<Payload>) -> HookFuture<HookOutcome> + Send + Sync>;

/// Handler invoked with the timer payload when a deferred callback expires.
pub type TimeoutCallback = Arc<dyn Fn(Option<Payload>) -> HookFuture<()> + Send + Sync>;

/// The hooks a module contributes. Every hook is optional.
#[derive(Clone, Default)]
pub struct HookSet {
    pub mention: Option<MentionHook>,
    pub context: Option<ContextHook>,
    pub timeout: Option<TimeoutCallback>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mention<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<HookOutcome>> + Send + 'static,
    {
        self.mention = Some(Arc::new(move |msg| Box::pin(hook(msg))));
        self
    }

    pub fn context<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<String>, Message, Option<Payload>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<HookOutcome>> + Send + 'static,
    {
        self.context = Some(Arc::new(move |key, msg, data| Box::pin(hook(key, msg, data))));
        self
    }

    pub fn timeout<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(Option<Payload>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.timeout = Some(Arc::new(move |data| Box::pin(callback(data))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mention.is_none() && self.context.is_none() && self.timeout.is_none()
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("mention", &self.mention.is_some())
            .field("context", &self.context.is_some())
            .field("timeout", &self.timeout.is_some())
            .finish()
    }
}

/// A pluggable behavior module.
///
/// Modules are installed once at startup in priority order (first in the
/// list is tried first by the mention chain).
pub trait AgentModule: Send + Sync {
    /// Unique, stable identifier. Contexts and timers are dispatched by it,
    /// so renaming a module orphans its persisted rows.
    fn name(&self) -> &str;

    /// Receive the agent handle before `install` is called.
    fn init(&mut self, _agent: AgentHandle) {}

    /// Build the module's hooks.
    fn install(&self) -> HookSet;
}
