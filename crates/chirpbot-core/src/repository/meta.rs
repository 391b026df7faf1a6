//! Process meta repository trait.

use chirpbot_types::error::RepositoryError;
use chirpbot_types::meta::ProcessMeta;

/// Storage for the singleton [`ProcessMeta`] record.
pub trait MetaRepository: Send + Sync {
    fn load_meta(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<ProcessMeta>, RepositoryError>> + Send;

    /// Insert or replace the singleton.
    fn save_meta(
        &self,
        meta: &ProcessMeta,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
