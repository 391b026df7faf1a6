//! In-memory store, recording social API and module fixtures for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chirpbot_types::config::AgentSettings;
use chirpbot_types::context::{ContextTarget, ConversationContext};
use chirpbot_types::error::{ApiError, RepositoryError};
use chirpbot_types::friend::AffinityRecord;
use chirpbot_types::message::Message;
use chirpbot_types::meta::ProcessMeta;
use chirpbot_types::note::{DriveFile, NewNote, Note, User};
use chirpbot_types::timer::DeferredCallback;
use chrono::Utc;
use uuid::Uuid;

use crate::agent::{AgentHandle, EventRouter};
use crate::api::{BoxSocialApi, SocialApi};
use crate::module::{AgentModule, HookRegistry, HookSet};
use crate::repository::{
    BoxStore, ContextRepository, FriendRepository, MetaRepository, ModuleDataRepository,
    TimerRepository,
};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    contexts: Vec<ConversationContext>,
    timers: Vec<DeferredCallback>,
    friends: HashMap<String, AffinityRecord>,
    meta: Option<ProcessMeta>,
    module_data: BTreeMap<(String, String), serde_json::Value>,
}

/// Store kept in a mutex; rows stay in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contexts(&self) -> Vec<ConversationContext> {
        self.state.lock().unwrap().contexts.clone()
    }

    pub fn timers(&self) -> Vec<DeferredCallback> {
        self.state.lock().unwrap().timers.clone()
    }

    pub fn push_timer(&self, timer: DeferredCallback) {
        self.state.lock().unwrap().timers.push(timer);
    }

    pub fn friends(&self) -> Vec<AffinityRecord> {
        self.state.lock().unwrap().friends.values().cloned().collect()
    }

    pub fn meta(&self) -> Option<ProcessMeta> {
        self.state.lock().unwrap().meta.clone()
    }

    pub fn set_meta(&self, meta: ProcessMeta) {
        self.state.lock().unwrap().meta = Some(meta);
    }
}

impl ContextRepository for InMemoryStore {
    async fn insert_context(&self, context: &ConversationContext) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().contexts.push(context.clone());
        Ok(())
    }

    async fn find_context(
        &self,
        target: &ContextTarget,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.contexts.iter().find(|c| &c.target == target).cloned())
    }

    async fn remove_contexts(&self, module: &str, key: Option<&str>) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.contexts.len();
        state
            .contexts
            .retain(|c| !(c.module == module && c.key.as_deref() == key));
        Ok((before - state.contexts.len()) as u64)
    }

    async fn list_contexts(&self) -> Result<Vec<ConversationContext>, RepositoryError> {
        Ok(self.contexts())
    }
}

impl TimerRepository for InMemoryStore {
    async fn insert_timer(&self, timer: &DeferredCallback) -> Result<(), RepositoryError> {
        self.push_timer(timer.clone());
        Ok(())
    }

    async fn list_timers(&self) -> Result<Vec<DeferredCallback>, RepositoryError> {
        Ok(self.timers())
    }

    async fn take_timer(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.timers.len();
        state.timers.retain(|t| &t.id != id);
        Ok(state.timers.len() < before)
    }
}

impl FriendRepository for InMemoryStore {
    async fn find_friend(&self, user_id: &str) -> Result<Option<AffinityRecord>, RepositoryError> {
        Ok(self.state.lock().unwrap().friends.get(user_id).cloned())
    }

    async fn add_affinity(
        &self,
        user_id: &str,
        user: Option<&User>,
        amount: f64,
    ) -> Result<AffinityRecord, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let record = state
            .friends
            .entry(user_id.to_string())
            .or_insert_with(|| AffinityRecord {
                user_id: user_id.to_string(),
                user: None,
                affinity: 0.0,
                created_at: now,
                updated_at: now,
            });
        record.affinity += amount;
        record.updated_at = now;
        if let Some(user) = user {
            record.user = Some(user.clone());
        }
        Ok(record.clone())
    }

    async fn list_friends(&self) -> Result<Vec<AffinityRecord>, RepositoryError> {
        let mut friends = self.friends();
        friends.sort_by(|a, b| b.affinity.total_cmp(&a.affinity));
        Ok(friends)
    }
}

impl MetaRepository for InMemoryStore {
    async fn load_meta(&self) -> Result<Option<ProcessMeta>, RepositoryError> {
        Ok(self.meta())
    }

    async fn save_meta(&self, meta: &ProcessMeta) -> Result<(), RepositoryError> {
        self.set_meta(meta.clone());
        Ok(())
    }
}

impl ModuleDataRepository for InMemoryStore {
    async fn get_module_data(
        &self,
        module: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .module_data
            .get(&(module.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_module_data(
        &self,
        module: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .module_data
            .insert((module.to_string(), key.to_string()), value.clone());
        Ok(())
    }

    async fn delete_module_data(&self, module: &str, key: &str) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .module_data
            .remove(&(module.to_string(), key.to_string()));
        Ok(())
    }

    async fn list_module_keys(&self, module: &str) -> Result<Vec<String>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .module_data
            .keys()
            .filter(|(m, _)| m == module)
            .map(|(_, k)| k.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Social API
// ---------------------------------------------------------------------------

/// Calls recorded by [`FakeApi`], excluding `fetch_self`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ShowNote(String),
    CreateReaction { note_id: String, reaction: String },
    ReadMessage(String),
    CreateNote(NewNote),
    SendMessage { user_id: String, text: Option<String> },
    UploadFile { file_name: String },
}

#[derive(Default)]
struct ApiState {
    calls: Vec<ApiCall>,
    notes: HashMap<String, Note>,
    fetch_self_failures: u32,
    fail_writes: bool,
}

/// Social API double that records calls and serves notes from a map.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<ApiState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn add_note(&self, note: Note) {
        self.state.lock().unwrap().notes.insert(note.id.clone(), note);
    }

    /// Make the next `times` identity fetches fail.
    pub fn fail_fetch_self(&self, times: u32) {
        self.state.lock().unwrap().fetch_self_failures = times;
    }

    /// Make reactions, read receipts and posts fail.
    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_writes {
            return Err(ApiError::Status {
                endpoint: "fake".into(),
                status: 500,
                body: "write failed".into(),
            });
        }
        Ok(())
    }
}

impl SocialApi for FakeApi {
    async fn fetch_self(&self) -> Result<User, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.fetch_self_failures > 0 {
            state.fetch_self_failures -= 1;
            return Err(ApiError::Http("connection refused".into()));
        }
        Ok(user("agent", "agent"))
    }

    async fn show_note(&self, note_id: &str) -> Result<Note, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::ShowNote(note_id.to_string()));
        state.notes.get(note_id).cloned().ok_or_else(|| ApiError::Status {
            endpoint: "notes/show".into(),
            status: 404,
            body: "no such note".into(),
        })
    }

    async fn create_reaction(&self, note_id: &str, reaction: &str) -> Result<(), ApiError> {
        self.record(ApiCall::CreateReaction {
            note_id: note_id.to_string(),
            reaction: reaction.to_string(),
        })
    }

    async fn read_message(&self, message_id: &str) -> Result<(), ApiError> {
        self.record(ApiCall::ReadMessage(message_id.to_string()))
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        self.record(ApiCall::CreateNote(note.clone()))?;
        let mut created = self::note("created", "agent", note.text.as_deref());
        created.reply_id = note.reply_id.clone();
        Ok(created)
    }

    async fn send_message(
        &self,
        user_id: &str,
        text: Option<&str>,
        _file_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::SendMessage {
            user_id: user_id.to_string(),
            text: text.map(str::to_string),
        })
    }

    async fn upload_file(
        &self,
        _bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<DriveFile, ApiError> {
        self.record(ApiCall::UploadFile {
            file_name: file_name.to_string(),
        })?;
        Ok(DriveFile {
            id: format!("file-{file_name}"),
            name: file_name.to_string(),
            url: None,
            content_type: Some(content_type.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Modules and fixtures
// ---------------------------------------------------------------------------

type InitFn = Box<dyn FnMut(AgentHandle) + Send + Sync>;

/// A module made of a fixed hook set.
pub struct TestModule {
    name: String,
    hooks: HookSet,
    on_init: Option<InitFn>,
}

impl TestModule {
    pub fn new(name: &str, hooks: HookSet) -> Self {
        Self {
            name: name.to_string(),
            hooks,
            on_init: None,
        }
    }

    pub fn on_init(mut self, f: impl FnMut(AgentHandle) + Send + Sync + 'static) -> Self {
        self.on_init = Some(Box::new(f));
        self
    }
}

impl AgentModule for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, agent: AgentHandle) {
        if let Some(f) = self.on_init.as_mut() {
            f(agent);
        }
    }

    fn install(&self) -> HookSet {
        self.hooks.clone()
    }
}

/// Ordered log of hook invocations shared between a test and its hooks.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        host: None,
        name: None,
        is_bot: false,
    }
}

pub fn note(id: &str, user_id: &str, text: Option<&str>) -> Note {
    Note {
        id: id.to_string(),
        created_at: None,
        user_id: user_id.to_string(),
        user: user(user_id, user_id),
        text: text.map(str::to_string),
        reply_id: None,
        renote_id: None,
        files: Vec::new(),
        visibility: None,
    }
}

/// A message saying "hello".
pub fn message_from(user_id: &str, id: &str, is_dm: bool, reply_id: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        user: user(user_id, user_id),
        text: Some("hello".to_string()),
        is_dm,
        reply_id: reply_id.map(str::to_string),
        files: Vec::new(),
    }
}

/// Handle for account `@agent` (id `agent`) with no previous heartbeat.
pub fn test_agent(store: InMemoryStore, api: FakeApi) -> AgentHandle {
    AgentHandle::new(
        user("agent", "agent"),
        None,
        BoxStore::new(store),
        BoxSocialApi::new(api),
    )
}

/// Router over `modules` installed in order, with default settings.
pub async fn router_with(
    store: InMemoryStore,
    api: FakeApi,
    modules: Vec<(&str, HookSet)>,
) -> EventRouter {
    let agent = test_agent(store, api);
    let modules: Vec<Box<dyn AgentModule>> = modules
        .into_iter()
        .map(|(name, hooks)| Box::new(TestModule::new(name, hooks)) as Box<dyn AgentModule>)
        .collect();
    let registry = HookRegistry::install(modules, &agent);
    EventRouter::new(agent, Arc::new(registry), Arc::new(AgentSettings::default()))
}
