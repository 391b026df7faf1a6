//! The running agent: module-facing handle, event router, deferred-callback
//! sweeper, heartbeat and the runtime that owns their tasks.

pub mod handle;
pub mod heartbeat;
pub mod intake;
pub mod retry;
pub mod router;
pub mod runtime;
pub mod sweeper;

pub use handle::AgentHandle;
pub use router::{Acknowledgment, DispatchError, EventRouter};
pub use runtime::Runtime;
pub use sweeper::Sweeper;

use std::time::Duration;

/// Shortest period the periodic tasks tick at; `tokio::time::interval`
/// rejects zero.
pub(crate) const MIN_TICK: Duration = Duration::from_millis(1);
