//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events; info to stdout, warnings to stderr)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → terminal / log collector
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every connection task runs inside a span carrying its connection id
//! - Metric updates are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
