//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → connection.rs (client numbering, live-connection tracking)
//!     → Hand off to the HTTP pipeline in a detached task
//! ```
//!
//! # Design Decisions
//! - No connection limit: every accepted connection gets its own task
//! - Accept errors are logged and never stop the listener

pub mod connection;
pub mod listener;

pub use connection::{ClientConnection, ClientId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
