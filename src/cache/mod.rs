//! Shared response cache subsystem.
//!
//! # Data Flow
//! ```text
//! GET pipeline
//!     → store.rs lookup  (shared side of lock.rs, recency via clock.rs)
//!         hit  → bytes written straight to the client
//!         miss → origin exchange, then store.rs store (exclusive side)
//! ```
//!
//! # Design Decisions
//! - One `ObjectCache` per process, created at startup and passed to the
//!   pipeline explicitly (no global state)
//! - Reader preference: lookups never wait behind a queued store
//! - Recency is a logical clock, not wall time

pub mod clock;
pub mod lock;
pub mod store;

pub use clock::LogicalClock;
pub use lock::{ReadGuard, ReaderPreferringLock, WriteGuard};
pub use store::ObjectCache;
