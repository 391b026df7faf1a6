//! BoxSocialApi -- object-safe dynamic dispatch wrapper for [`SocialApi`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chirpbot_types::error::ApiError;
use chirpbot_types::note::{DriveFile, NewNote, Note, User};

use super::SocialApi;

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Object-safe version of [`SocialApi`] with boxed futures.
pub trait SocialApiDyn: Send + Sync {
    fn fetch_self_boxed(&self) -> BoxFut<'_, User>;
    fn show_note_boxed<'a>(&'a self, note_id: &'a str) -> BoxFut<'a, Note>;
    fn create_reaction_boxed<'a>(&'a self, note_id: &'a str, reaction: &'a str) -> BoxFut<'a, ()>;
    fn read_message_boxed<'a>(&'a self, message_id: &'a str) -> BoxFut<'a, ()>;
    fn create_note_boxed<'a>(&'a self, note: &'a NewNote) -> BoxFut<'a, Note>;
    fn send_message_boxed<'a>(
        &'a self,
        user_id: &'a str,
        text: Option<&'a str>,
        file_id: Option<&'a str>,
    ) -> BoxFut<'a, ()>;
    fn upload_file_boxed<'a>(
        &'a self,
        bytes: Vec<u8>,
        file_name: &'a str,
        content_type: &'a str,
    ) -> BoxFut<'a, DriveFile>;
}

impl<T: SocialApi> SocialApiDyn for T {
    fn fetch_self_boxed(&self) -> BoxFut<'_, User> {
        Box::pin(self.fetch_self())
    }

    fn show_note_boxed<'a>(&'a self, note_id: &'a str) -> BoxFut<'a, Note> {
        Box::pin(self.show_note(note_id))
    }

    fn create_reaction_boxed<'a>(&'a self, note_id: &'a str, reaction: &'a str) -> BoxFut<'a, ()> {
        Box::pin(self.create_reaction(note_id, reaction))
    }

    fn read_message_boxed<'a>(&'a self, message_id: &'a str) -> BoxFut<'a, ()> {
        Box::pin(self.read_message(message_id))
    }

    fn create_note_boxed<'a>(&'a self, note: &'a NewNote) -> BoxFut<'a, Note> {
        Box::pin(self.create_note(note))
    }

    fn send_message_boxed<'a>(
        &'a self,
        user_id: &'a str,
        text: Option<&'a str>,
        file_id: Option<&'a str>,
    ) -> BoxFut<'a, ()> {
        Box::pin(self.send_message(user_id, text, file_id))
    }

    fn upload_file_boxed<'a>(
        &'a self,
        bytes: Vec<u8>,
        file_name: &'a str,
        content_type: &'a str,
    ) -> BoxFut<'a, DriveFile> {
        Box::pin(self.upload_file(bytes, file_name, content_type))
    }
}

/// Type-erased social API client. Cloning shares the same client.
#[derive(Clone)]
pub struct BoxSocialApi {
    inner: Arc<dyn SocialApiDyn>,
}

impl BoxSocialApi {
    pub fn new<T: SocialApi + 'static>(api: T) -> Self {
        Self {
            inner: Arc::new(api),
        }
    }

    pub async fn fetch_self(&self) -> Result<User, ApiError> {
        self.inner.fetch_self_boxed().await
    }

    pub async fn show_note(&self, note_id: &str) -> Result<Note, ApiError> {
        self.inner.show_note_boxed(note_id).await
    }

    pub async fn create_reaction(&self, note_id: &str, reaction: &str) -> Result<(), ApiError> {
        self.inner.create_reaction_boxed(note_id, reaction).await
    }

    pub async fn read_message(&self, message_id: &str) -> Result<(), ApiError> {
        self.inner.read_message_boxed(message_id).await
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        self.inner.create_note_boxed(note).await
    }

    pub async fn send_message(
        &self,
        user_id: &str,
        text: Option<&str>,
        file_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.inner.send_message_boxed(user_id, text, file_id).await
    }

    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<DriveFile, ApiError> {
        self.inner.upload_file_boxed(bytes, file_name, content_type).await
    }
}

impl std::fmt::Debug for BoxSocialApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSocialApi").finish_non_exhaustive()
    }
}
