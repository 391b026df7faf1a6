//! Outbound social API port.
//!
//! The request/response calls the core depends on. The concrete HTTP client
//! lives in chirpbot-infra; the router and modules only see this trait (via
//! [`BoxSocialApi`]).

pub mod box_api;

pub use box_api::BoxSocialApi;

use chirpbot_types::error::ApiError;
use chirpbot_types::note::{DriveFile, NewNote, Note, User};

/// Authenticated calls against the social network.
///
/// Uses native async fn in traits; see [`BoxSocialApi`] for dynamic dispatch.
pub trait SocialApi: Send + Sync {
    /// The account the token belongs to.
    fn fetch_self(&self) -> impl std::future::Future<Output = Result<User, ApiError>> + Send;

    /// Fetch a note by id.
    fn show_note(
        &self,
        note_id: &str,
    ) -> impl std::future::Future<Output = Result<Note, ApiError>> + Send;

    /// Attach a reaction to a note.
    fn create_reaction(
        &self,
        note_id: &str,
        reaction: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Mark a direct message as read.
    fn read_message(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Publish a note and return it.
    fn create_note(
        &self,
        note: &NewNote,
    ) -> impl std::future::Future<Output = Result<Note, ApiError>> + Send;

    /// Send a direct message to a user.
    fn send_message(
        &self,
        user_id: &str,
        text: Option<&str>,
        file_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Upload a file to the drive.
    fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<DriveFile, ApiError>> + Send;
}
