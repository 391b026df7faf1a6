//! Hook registry.
//!
//! Built once at startup from the ordered module list. Mention hooks keep
//! installation order (position = priority); context hooks and timeout
//! callbacks are keyed by module name, one of each per module.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::{AgentModule, ContextHook, HookSet, MentionHook, TimeoutCallback};
use crate::agent::AgentHandle;

/// Registry of installed module hooks.
#[derive(Default)]
pub struct HookRegistry {
    mention_hooks: Vec<(String, MentionHook)>,
    context_hooks: HashMap<String, ContextHook>,
    timeout_callbacks: HashMap<String, TimeoutCallback>,
    modules: Vec<Box<dyn AgentModule>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize and install `modules` in order.
    pub fn install(modules: Vec<Box<dyn AgentModule>>, agent: &AgentHandle) -> Self {
        let mut registry = Self::new();
        for mut module in modules {
            info!(module = %module.name(), "installing module");
            module.init(agent.clone());
            let hooks = module.install();
            let name = module.name().to_string();
            registry.register(&name, hooks);
            registry.modules.push(module);
        }
        registry
    }

    /// Register one module's hooks.
    ///
    /// A second registration under the same name appends another mention
    /// hook but replaces the context hook and timeout callback.
    pub fn register(&mut self, module: &str, hooks: HookSet) {
        debug!(%module, ?hooks, "registering hooks");
        if let Some(hook) = hooks.mention {
            self.mention_hooks.push((module.to_string(), hook));
        }
        if let Some(hook) = hooks.context {
            if self.context_hooks.insert(module.to_string(), hook).is_some() {
                warn!(%module, "context hook replaced by a later registration");
            }
        }
        if let Some(callback) = hooks.timeout {
            if self.timeout_callbacks.insert(module.to_string(), callback).is_some() {
                warn!(%module, "timeout callback replaced by a later registration");
            }
        }
    }

    /// Mention hooks in priority order, paired with their module name.
    pub fn mention_hooks(&self) -> &[(String, MentionHook)] {
        &self.mention_hooks
    }

    pub fn context_hook(&self, module: &str) -> Option<&ContextHook> {
        self.context_hooks.get(module)
    }

    pub fn timeout_callback(&self, module: &str) -> Option<&TimeoutCallback> {
        self.timeout_callbacks.get(module)
    }

    /// Names of the installed modules in installation order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("modules", &self.module_names())
            .field("mention_hooks", &self.mention_hooks.len())
            .field("context_hooks", &self.context_hooks.len())
            .field("timeout_callbacks", &self.timeout_callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, InMemoryStore, TestModule, test_agent};
    use chirpbot_types::hook::HookOutcome;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn install_keeps_mention_order() {
        let agent = test_agent(InMemoryStore::new(), FakeApi::new());
        let modules: Vec<Box<dyn AgentModule>> = vec![
            Box::new(TestModule::new("first", HookSet::new().mention(|_| async { Ok(HookOutcome::Pass) }))),
            Box::new(TestModule::new("silent", HookSet::new())),
            Box::new(TestModule::new("second", HookSet::new().mention(|_| async { Ok(HookOutcome::Pass) }))),
        ];

        let registry = HookRegistry::install(modules, &agent);

        let order: Vec<&str> = registry.mention_hooks().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["first", "second"]);
        assert_eq!(registry.module_names(), vec!["first", "silent", "second"]);
    }

    #[tokio::test]
    async fn install_calls_init_with_handle() {
        let agent = test_agent(InMemoryStore::new(), FakeApi::new());
        let seen = Arc::new(Mutex::new(None));
        let module = TestModule::new("watcher", HookSet::new()).on_init({
            let seen = Arc::clone(&seen);
            move |agent: AgentHandle| {
                *seen.lock().unwrap() = Some(agent.account().username.clone());
            }
        });

        let _registry = HookRegistry::install(vec![Box::new(module)], &agent);

        assert_eq!(seen.lock().unwrap().as_deref(), Some("agent"));
    }

    #[test]
    fn context_and_timeout_keyed_by_module() {
        let mut registry = HookRegistry::new();
        registry.register(
            "quiz",
            HookSet::new()
                .context(|_, _, _| async { Ok(HookOutcome::Handled) })
                .timeout(|_| async { Ok(()) }),
        );

        assert!(registry.context_hook("quiz").is_some());
        assert!(registry.timeout_callback("quiz").is_some());
        assert!(registry.context_hook("other").is_none());
        assert!(registry.mention_hooks().is_empty());
    }

    #[test]
    fn debug_impl() {
        let registry = HookRegistry::new();
        let debug = format!("{registry:?}");
        assert!(debug.contains("HookRegistry"));
        assert!(debug.contains("mention_hooks"));
    }
}
