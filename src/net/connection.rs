//! Client connection bookkeeping.
//!
//! # Responsibilities
//! - Number accepted clients so their log lines can be told apart
//! - Count connection tasks still running for the active-connections gauge
//! - Log how long each client was served once its task ends

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;

/// Sequence number of an accepted client, starting at 1 per server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    active: AtomicU64,
}

/// Shared by the accept loop; hands out one [`ClientConnection`] per client.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    counters: Arc<Counters>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted client. The returned handle must live as
    /// long as the task serving it.
    pub fn track(&self, peer: SocketAddr) -> ClientConnection {
        let id = ClientId(self.counters.accepted.fetch_add(1, Ordering::Relaxed) + 1);
        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_active_connections(active);
        ClientConnection {
            counters: Arc::clone(&self.counters),
            id,
            peer,
            accepted_at: Instant::now(),
        }
    }

    /// Clients whose task is still running.
    pub fn active_count(&self) -> u64 {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Clients accepted since the tracker was created.
    pub fn accepted_count(&self) -> u64 {
        self.counters.accepted.load(Ordering::Relaxed)
    }
}

/// One client being served. Dropping it marks the client finished.
#[derive(Debug)]
pub struct ClientConnection {
    counters: Arc<Counters>,
    id: ClientId,
    peer: SocketAddr,
    accepted_at: Instant,
}

impl ClientConnection {
    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Drop for ClientConnection {
    fn drop(&mut self) {
        let active = self.counters.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_connections(active);
        tracing::debug!(
            client = %self.id,
            peer = %self.peer,
            elapsed_ms = self.accepted_at.elapsed().as_millis() as u64,
            "Client finished"
        );
    }
}
