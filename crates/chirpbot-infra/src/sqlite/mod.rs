//! SQLite storage layer.
//!
//! One [`SqliteStore`] implements every repository trait from
//! `chirpbot-core`, over split read/write connection pools in WAL mode.

pub mod context;
pub mod friend;
pub mod meta;
pub mod module_data;
pub mod pool;
pub mod store;
pub mod timer;

pub use pool::DatabasePool;
pub use store::SqliteStore;
