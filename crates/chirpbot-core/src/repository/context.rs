//! Conversation context repository trait.

use chirpbot_types::context::{ContextTarget, ConversationContext};
use chirpbot_types::error::RepositoryError;

/// Storage for conversation contexts.
///
/// No de-duplication is performed: several rows may share a target, and
/// `find_context` must return the oldest one (insertion order).
pub trait ContextRepository: Send + Sync {
    /// Insert a new context row.
    fn insert_context(
        &self,
        context: &ConversationContext,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// First context (by insertion order) waiting on `target`.
    fn find_context(
        &self,
        target: &ContextTarget,
    ) -> impl std::future::Future<Output = Result<Option<ConversationContext>, RepositoryError>> + Send;

    /// Remove every context owned by `module` with continuation key `key`.
    ///
    /// Returns the number of rows removed.
    fn remove_contexts(
        &self,
        module: &str,
        key: Option<&str>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// All contexts in insertion order.
    fn list_contexts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationContext>, RepositoryError>> + Send;
}
