//! OS signal handling.
//!
//! Ctrl-C (SIGINT) stops the accept loop. Broken pipes never reach the
//! process: Rust ignores SIGPIPE, and a write to a closed client surfaces as
//! an I/O error on that connection only.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl-C, then trigger `shutdown`.
pub async fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
        Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
