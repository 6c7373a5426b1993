//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Route events by severity: WARN and ERROR to stderr, the rest to stdout
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - Plain human-readable format; no structured format is required downstream

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter from `RUST_LOG`, falling back to `level` for this crate.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("forward_proxy={level}")))
}

/// Install the global subscriber.
pub fn init(level: &str) {
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let result = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .try_init();

    if let Err(e) = result {
        // A subscriber is already installed (e.g. by a test harness).
        eprintln!("logging already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init("info");
        init("info");
    }
}
