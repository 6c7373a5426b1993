//! Caching HTTP/1.0 Forward Proxy Library
//!
//! Accepts absolute-form `GET` requests, forwards them to the origin with
//! rewritten headers, relays the response byte-for-byte and keeps small
//! responses in a shared fixed-capacity cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use cache::ObjectCache;
pub use config::schema::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
