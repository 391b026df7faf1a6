//! Remote social network access: request/response API client and the
//! streaming (WebSocket) event client.

pub mod client;
pub mod stream;

pub use client::HttpSocialApi;
pub use stream::StreamClient;
