//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with the connection pipeline
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; the defaults are the classic proxy constants
//!   (10 cache slots, 100 KiB objects, 8 KiB lines and relay chunks)
//! - The listening port is not part of the file; it always comes from argv
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CacheConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig};
