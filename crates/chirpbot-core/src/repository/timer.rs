//! Deferred callback repository trait.

use chirpbot_types::error::RepositoryError;
use chirpbot_types::timer::DeferredCallback;
use uuid::Uuid;

/// Storage for durable timers.
pub trait TimerRepository: Send + Sync {
    fn insert_timer(
        &self,
        timer: &DeferredCallback,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All pending timers in insertion order.
    fn list_timers(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DeferredCallback>, RepositoryError>> + Send;

    /// Delete a timer, returning `true` only if this call removed it.
    ///
    /// The sweeper fires a timer only after winning this delete, so the
    /// operation must be atomic with respect to concurrent callers.
    fn take_timer(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
