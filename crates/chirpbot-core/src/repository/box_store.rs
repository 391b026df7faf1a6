//! BoxStore -- object-safe dynamic dispatch wrapper for [`Store`].
//!
//! Same blanket-impl pattern as the social API wrapper:
//! 1. Define an object-safe `StoreDyn` trait with boxed futures
//! 2. Blanket-impl `StoreDyn` for all `T: Store`
//! 3. `BoxStore` wraps `Arc<dyn StoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chirpbot_types::context::{ContextTarget, ConversationContext};
use chirpbot_types::error::RepositoryError;
use chirpbot_types::friend::AffinityRecord;
use chirpbot_types::meta::ProcessMeta;
use chirpbot_types::note::User;
use chirpbot_types::timer::DeferredCallback;
use uuid::Uuid;

use super::Store;

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`Store`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn StoreDyn`).
/// A blanket implementation is provided for all types implementing `Store`.
pub trait StoreDyn: Send + Sync {
    fn insert_context_boxed<'a>(&'a self, context: &'a ConversationContext) -> BoxFut<'a, ()>;
    fn find_context_boxed<'a>(
        &'a self,
        target: &'a ContextTarget,
    ) -> BoxFut<'a, Option<ConversationContext>>;
    fn remove_contexts_boxed<'a>(&'a self, module: &'a str, key: Option<&'a str>)
    -> BoxFut<'a, u64>;
    fn list_contexts_boxed(&self) -> BoxFut<'_, Vec<ConversationContext>>;

    fn insert_timer_boxed<'a>(&'a self, timer: &'a DeferredCallback) -> BoxFut<'a, ()>;
    fn list_timers_boxed(&self) -> BoxFut<'_, Vec<DeferredCallback>>;
    fn take_timer_boxed<'a>(&'a self, id: &'a Uuid) -> BoxFut<'a, bool>;

    fn find_friend_boxed<'a>(&'a self, user_id: &'a str) -> BoxFut<'a, Option<AffinityRecord>>;
    fn add_affinity_boxed<'a>(
        &'a self,
        user_id: &'a str,
        user: Option<&'a User>,
        amount: f64,
    ) -> BoxFut<'a, AffinityRecord>;
    fn list_friends_boxed(&self) -> BoxFut<'_, Vec<AffinityRecord>>;

    fn load_meta_boxed(&self) -> BoxFut<'_, Option<ProcessMeta>>;
    fn save_meta_boxed<'a>(&'a self, meta: &'a ProcessMeta) -> BoxFut<'a, ()>;

    fn get_module_data_boxed<'a>(
        &'a self,
        module: &'a str,
        key: &'a str,
    ) -> BoxFut<'a, Option<serde_json::Value>>;
    fn set_module_data_boxed<'a>(
        &'a self,
        module: &'a str,
        key: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFut<'a, ()>;
    fn delete_module_data_boxed<'a>(&'a self, module: &'a str, key: &'a str) -> BoxFut<'a, ()>;
    fn list_module_keys_boxed<'a>(&'a self, module: &'a str) -> BoxFut<'a, Vec<String>>;
}

/// Blanket implementation: any `Store` automatically implements `StoreDyn`.
impl<T: Store> StoreDyn for T {
    fn insert_context_boxed<'a>(&'a self, context: &'a ConversationContext) -> BoxFut<'a, ()> {
        Box::pin(self.insert_context(context))
    }

    fn find_context_boxed<'a>(
        &'a self,
        target: &'a ContextTarget,
    ) -> BoxFut<'a, Option<ConversationContext>> {
        Box::pin(self.find_context(target))
    }

    fn remove_contexts_boxed<'a>(
        &'a self,
        module: &'a str,
        key: Option<&'a str>,
    ) -> BoxFut<'a, u64> {
        Box::pin(self.remove_contexts(module, key))
    }

    fn list_contexts_boxed(&self) -> BoxFut<'_, Vec<ConversationContext>> {
        Box::pin(self.list_contexts())
    }

    fn insert_timer_boxed<'a>(&'a self, timer: &'a DeferredCallback) -> BoxFut<'a, ()> {
        Box::pin(self.insert_timer(timer))
    }

    fn list_timers_boxed(&self) -> BoxFut<'_, Vec<DeferredCallback>> {
        Box::pin(self.list_timers())
    }

    fn take_timer_boxed<'a>(&'a self, id: &'a Uuid) -> BoxFut<'a, bool> {
        Box::pin(self.take_timer(id))
    }

    fn find_friend_boxed<'a>(&'a self, user_id: &'a str) -> BoxFut<'a, Option<AffinityRecord>> {
        Box::pin(self.find_friend(user_id))
    }

    fn add_affinity_boxed<'a>(
        &'a self,
        user_id: &'a str,
        user: Option<&'a User>,
        amount: f64,
    ) -> BoxFut<'a, AffinityRecord> {
        Box::pin(self.add_affinity(user_id, user, amount))
    }

    fn list_friends_boxed(&self) -> BoxFut<'_, Vec<AffinityRecord>> {
        Box::pin(self.list_friends())
    }

    fn load_meta_boxed(&self) -> BoxFut<'_, Option<ProcessMeta>> {
        Box::pin(self.load_meta())
    }

    fn save_meta_boxed<'a>(&'a self, meta: &'a ProcessMeta) -> BoxFut<'a, ()> {
        Box::pin(self.save_meta(meta))
    }

    fn get_module_data_boxed<'a>(
        &'a self,
        module: &'a str,
        key: &'a str,
    ) -> BoxFut<'a, Option<serde_json::Value>> {
        Box::pin(self.get_module_data(module, key))
    }

    fn set_module_data_boxed<'a>(
        &'a self,
        module: &'a str,
        key: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFut<'a, ()> {
        Box::pin(self.set_module_data(module, key, value))
    }

    fn delete_module_data_boxed<'a>(&'a self, module: &'a str, key: &'a str) -> BoxFut<'a, ()> {
        Box::pin(self.delete_module_data(module, key))
    }

    fn list_module_keys_boxed<'a>(&'a self, module: &'a str) -> BoxFut<'a, Vec<String>> {
        Box::pin(self.list_module_keys(module))
    }
}

/// Type-erased store shared by the router, the sweeper, the heartbeat and
/// every module handle.
///
/// Since the repository traits use RPITIT, they cannot be used as trait
/// objects directly. `BoxStore` provides equivalent methods that delegate to
/// the inner `StoreDyn` trait object. Cloning shares the same store.
#[derive(Clone)]
pub struct BoxStore {
    inner: Arc<dyn StoreDyn>,
}

impl BoxStore {
    /// Wrap a concrete `Store` in a type-erased handle.
    pub fn new<T: Store + 'static>(store: T) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub async fn insert_context(&self, context: &ConversationContext) -> Result<(), RepositoryError> {
        self.inner.insert_context_boxed(context).await
    }

    pub async fn find_context(
        &self,
        target: &ContextTarget,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        self.inner.find_context_boxed(target).await
    }

    pub async fn remove_contexts(
        &self,
        module: &str,
        key: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        self.inner.remove_contexts_boxed(module, key).await
    }

    pub async fn list_contexts(&self) -> Result<Vec<ConversationContext>, RepositoryError> {
        self.inner.list_contexts_boxed().await
    }

    pub async fn insert_timer(&self, timer: &DeferredCallback) -> Result<(), RepositoryError> {
        self.inner.insert_timer_boxed(timer).await
    }

    pub async fn list_timers(&self) -> Result<Vec<DeferredCallback>, RepositoryError> {
        self.inner.list_timers_boxed().await
    }

    pub async fn take_timer(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        self.inner.take_timer_boxed(id).await
    }

    pub async fn find_friend(&self, user_id: &str) -> Result<Option<AffinityRecord>, RepositoryError> {
        self.inner.find_friend_boxed(user_id).await
    }

    pub async fn add_affinity(
        &self,
        user_id: &str,
        user: Option<&User>,
        amount: f64,
    ) -> Result<AffinityRecord, RepositoryError> {
        self.inner.add_affinity_boxed(user_id, user, amount).await
    }

    pub async fn list_friends(&self) -> Result<Vec<AffinityRecord>, RepositoryError> {
        self.inner.list_friends_boxed().await
    }

    pub async fn load_meta(&self) -> Result<Option<ProcessMeta>, RepositoryError> {
        self.inner.load_meta_boxed().await
    }

    pub async fn save_meta(&self, meta: &ProcessMeta) -> Result<(), RepositoryError> {
        self.inner.save_meta_boxed(meta).await
    }

    pub async fn get_module_data(
        &self,
        module: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        self.inner.get_module_data_boxed(module, key).await
    }

    pub async fn set_module_data(
        &self,
        module: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.inner.set_module_data_boxed(module, key, value).await
    }

    pub async fn delete_module_data(&self, module: &str, key: &str) -> Result<(), RepositoryError> {
        self.inner.delete_module_data_boxed(module, key).await
    }

    pub async fn list_module_keys(&self, module: &str) -> Result<Vec<String>, RepositoryError> {
        self.inner.list_module_keys_boxed(module).await
    }
}

impl std::fmt::Debug for BoxStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxStore").finish_non_exhaustive()
    }
}
