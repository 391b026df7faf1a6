//! Affinity ledger repository trait.

use chirpbot_types::error::RepositoryError;
use chirpbot_types::friend::AffinityRecord;
use chirpbot_types::note::User;

pub trait FriendRepository: Send + Sync {
    /// Look up a record without creating it.
    fn find_friend(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<AffinityRecord>, RepositoryError>> + Send;

    /// Add `amount` to the user's affinity, creating the record at 0 first if
    /// absent. A provided `user` snapshot replaces the stored one.
    ///
    /// Returns the updated record.
    fn add_affinity(
        &self,
        user_id: &str,
        user: Option<&User>,
        amount: f64,
    ) -> impl std::future::Future<Output = Result<AffinityRecord, RepositoryError>> + Send;

    /// All records, highest affinity first.
    fn list_friends(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<AffinityRecord>, RepositoryError>> + Send;
}
