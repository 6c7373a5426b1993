//! Accept loop and per-connection dispatch.
//!
//! # Responsibilities
//! - Accept client connections until shutdown is signalled
//! - Spawn one detached task per connection running the request pipeline
//! - Log every request failure once, at the connection boundary
//!
//! # Design Decisions
//! - No admission control or connection limit
//! - Shutdown stops accepting; connection tasks already running finish on
//!   their own and are never cancelled

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::cache::ObjectCache;
use crate::config::ProxyConfig;
use crate::http::pipeline::{Outcome, RequestPipeline};
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;

/// The forward proxy server.
pub struct ProxyServer {
    pipeline: Arc<RequestPipeline>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    /// Create a server whose connections share `cache`.
    pub fn new(config: &ProxyConfig, cache: Arc<ObjectCache>) -> Self {
        Self {
            pipeline: Arc::new(RequestPipeline::new(config, cache)),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Run the accept loop until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Proxy server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(e) => tracing::error!(error = %e, "Accept error"),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        tracing::info!(
            accepted = self.tracker.accepted_count(),
            active_connections = self.tracker.active_count(),
            "Proxy server stopped"
        );
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        tracing::info!("Accepted connection from ({}, {})", peer.ip(), peer.port());
        metrics::record_connection_accepted();

        let client = self.tracker.track(peer);
        let span = tracing::info_span!("connection", client = %client.id(), peer = %client.peer());
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(
            async move {
                let _client = client;
                let mut stream = stream;

                match pipeline.handle(&mut stream).await {
                    Ok(outcome) => {
                        metrics::record_request(outcome.label());
                        if outcome == Outcome::NoRequest {
                            tracing::debug!("Client closed without a request");
                        }
                    }
                    Err(e) => {
                        metrics::record_request(e.kind());
                        tracing::warn!(kind = e.kind(), error = %e, "Request aborted");
                    }
                }

                // Error or not, the client gets no more bytes.
                let _ = stream.shutdown().await;
            }
            .instrument(span),
        );
    }
}
