//! Infrastructure for chirpbot: the SQLite store, the social API client,
//! the streaming client and the config-file loader.

pub mod config;
pub mod remote;
pub mod sqlite;
