//! Module-facing agent handle.
//!
//! `AgentHandle` is what a module receives in `init`. It owns the
//! serialization policy for contexts, timers, affinity and meta: modules ask
//! it to subscribe, schedule or reply, and never touch the store directly.

use std::sync::Arc;
use std::time::Duration;

use chirpbot_types::Payload;
use chirpbot_types::context::{ContextTarget, ConversationContext};
use chirpbot_types::error::{ApiError, RepositoryError};
use chirpbot_types::friend::AffinityRecord;
use chirpbot_types::message::Message;
use chirpbot_types::meta::{MetaPatch, ProcessMeta};
use chirpbot_types::note::{DriveFile, NewNote, Note, User};
use chirpbot_types::timer::DeferredCallback;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::BoxSocialApi;
use crate::repository::BoxStore;

/// Cloneable handle to the agent's identity, memory and outbound API.
#[derive(Clone)]
pub struct AgentHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    account: User,
    last_sleeped_at: Option<i64>,
    store: BoxStore,
    api: BoxSocialApi,
}

impl AgentHandle {
    pub fn new(
        account: User,
        last_sleeped_at: Option<i64>,
        store: BoxStore,
        api: BoxSocialApi,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                account,
                last_sleeped_at,
                store,
                api,
            }),
        }
    }

    /// The agent's own account.
    pub fn account(&self) -> &User {
        &self.inner.account
    }

    /// Last heartbeat recorded before this process started (epoch ms).
    ///
    /// `None` on the very first run.
    pub fn last_sleeped_at(&self) -> Option<i64> {
        self.inner.last_sleeped_at
    }

    pub fn store(&self) -> &BoxStore {
        &self.inner.store
    }

    pub fn api(&self) -> &BoxSocialApi {
        &self.inner.api
    }

    // -----------------------------------------------------------------------
    // Conversation contexts
    // -----------------------------------------------------------------------

    /// Wait for the next reply in a conversation.
    ///
    /// `id` is the peer user id when `is_dm`, otherwise the note id whose
    /// replies should be routed to `module`'s context hook. Existing contexts
    /// for the same conversation are left in place.
    pub async fn subscribe_reply(
        &self,
        module: &str,
        key: Option<&str>,
        is_dm: bool,
        id: &str,
        data: Option<Payload>,
    ) -> Result<ConversationContext, RepositoryError> {
        let context = ConversationContext::new(
            module,
            key.map(str::to_string),
            ContextTarget::new(is_dm, id),
            data,
        );
        self.inner.store.insert_context(&context).await?;
        debug!(%module, ?key, target = ?context.target, "context subscribed");
        Ok(context)
    }

    /// Stop waiting: remove every context of `module` with continuation key
    /// `key`, across all conversations. Returns the number removed.
    pub async fn unsubscribe_reply(
        &self,
        module: &str,
        key: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        let removed = self.inner.store.remove_contexts(module, key).await?;
        debug!(%module, ?key, removed, "context unsubscribed");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Deferred callbacks
    // -----------------------------------------------------------------------

    /// Persist a timer that calls `module`'s timeout callback with `data`
    /// once `delay` has elapsed, even across restarts.
    pub async fn set_timeout_with_persistence(
        &self,
        module: &str,
        delay: Duration,
        data: Option<Payload>,
    ) -> Result<Uuid, RepositoryError> {
        let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        let timer = DeferredCallback::new(module, delay_ms, data);
        self.inner.store.insert_timer(&timer).await?;
        info!(%module, id = %timer.id, delay_ms, "timer persisted");
        Ok(timer.id)
    }

    // -----------------------------------------------------------------------
    // Affinity
    // -----------------------------------------------------------------------

    /// Add `amount` to `user`'s affinity, creating the record if needed.
    pub async fn increment_affinity(
        &self,
        user: &User,
        amount: f64,
    ) -> Result<AffinityRecord, RepositoryError> {
        let record = self.inner.store.add_affinity(&user.id, Some(user), amount).await?;
        debug!(user_id = %user.id, affinity = record.affinity, "affinity updated");
        Ok(record)
    }

    pub async fn lookup_friend(&self, user_id: &str) -> Result<Option<AffinityRecord>, RepositoryError> {
        self.inner.store.find_friend(user_id).await
    }

    // -----------------------------------------------------------------------
    // Process meta
    // -----------------------------------------------------------------------

    /// The singleton meta record, created with `last_waking_at = now` if absent.
    pub async fn read_meta(&self) -> Result<ProcessMeta, RepositoryError> {
        if let Some(meta) = self.inner.store.load_meta().await? {
            return Ok(meta);
        }
        let meta = ProcessMeta::new(Utc::now().timestamp_millis());
        self.inner.store.save_meta(&meta).await?;
        Ok(meta)
    }

    /// Merge `patch` into the singleton and persist it.
    pub async fn update_meta(&self, patch: MetaPatch) -> Result<ProcessMeta, RepositoryError> {
        let mut meta = self.read_meta().await?;
        meta.merge(patch);
        self.inner.store.save_meta(&meta).await?;
        Ok(meta)
    }

    // -----------------------------------------------------------------------
    // Module-private data
    // -----------------------------------------------------------------------

    pub async fn module_data(
        &self,
        module: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        self.inner.store.get_module_data(module, key).await
    }

    pub async fn set_module_data(
        &self,
        module: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.inner.store.set_module_data(module, key, value).await
    }

    pub async fn delete_module_data(&self, module: &str, key: &str) -> Result<(), RepositoryError> {
        self.inner.store.delete_module_data(module, key).await
    }

    /// Keys `module` has stored, in key order.
    pub async fn module_data_keys(&self, module: &str) -> Result<Vec<String>, RepositoryError> {
        self.inner.store.list_module_keys(module).await
    }

    // -----------------------------------------------------------------------
    // Outbound helpers
    // -----------------------------------------------------------------------

    /// Answer `msg` in the same channel it arrived on.
    ///
    /// Direct messages get a direct message back; notes get a reply note.
    pub async fn reply(
        &self,
        msg: &Message,
        text: &str,
        file: Option<&DriveFile>,
    ) -> Result<(), ApiError> {
        if msg.is_dm {
            self.send_message(msg.user_id(), text, file).await
        } else {
            let note = NewNote {
                text: Some(text.to_string()),
                reply_id: Some(msg.id.clone()),
                file_ids: file.map(|f| f.id.clone()).into_iter().collect(),
                ..Default::default()
            };
            self.post(&note).await.map(|_| ())
        }
    }

    pub async fn post(&self, note: &NewNote) -> Result<Note, ApiError> {
        self.inner.api.create_note(note).await
    }

    pub async fn send_message(
        &self,
        user_id: &str,
        text: &str,
        file: Option<&DriveFile>,
    ) -> Result<(), ApiError> {
        self.inner
            .api
            .send_message(user_id, Some(text), file.map(|f| f.id.as_str()))
            .await
    }

    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<DriveFile, ApiError> {
        self.inner.api.upload_file(bytes, file_name, content_type).await
    }

    pub async fn show_note(&self, note_id: &str) -> Result<Note, ApiError> {
        self.inner.api.show_note(note_id).await
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("account", &self.inner.account.acct())
            .field("last_sleeped_at", &self.inner.last_sleeped_at)
            .finish()
    }
}
