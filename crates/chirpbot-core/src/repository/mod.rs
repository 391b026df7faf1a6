//! Repository trait definitions (ports).
//!
//! One narrow trait per persisted collection. The infrastructure layer
//! (chirpbot-infra) implements them; lookups are equality based and any
//! indices are a performance detail of the implementation.

pub mod box_store;
pub mod context;
pub mod friend;
pub mod meta;
pub mod module_data;
pub mod timer;

pub use box_store::BoxStore;
pub use context::ContextRepository;
pub use friend::FriendRepository;
pub use meta::MetaRepository;
pub use module_data::ModuleDataRepository;
pub use timer::TimerRepository;

/// The whole persistent memory: every collection the agent uses.
///
/// Blanket-implemented for any type that implements all collection traits.
pub trait Store:
    ContextRepository + TimerRepository + FriendRepository + MetaRepository + ModuleDataRepository
{
}

impl<T> Store for T where
    T: ContextRepository
        + TimerRepository
        + FriendRepository
        + MetaRepository
        + ModuleDataRepository
{
}
