//! TCP listener.
//!
//! # Responsibilities
//! - Bind to the configured host and the port given on the command line
//! - Accept incoming TCP connections

use std::net::{IpAddr, SocketAddr};

use tokio::net::{TcpListener, TcpStream};

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// The proxy's listening socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `config.bind_host` on `port`. Port 0 picks a free port.
    pub async fn bind(config: &ListenerConfig, port: u16) -> Result<Self, ListenerError> {
        let host: IpAddr = config.bind_host.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(SocketAddr::new(host, port))
            .await
            .map_err(ListenerError::Bind)?;

        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner: listener })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        self.inner.accept().await.map_err(ListenerError::Accept)
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port_and_accepts() {
        let config = ListenerConfig {
            bind_host: "127.0.0.1".into(),
        };
        let listener = Listener::bind(&config, 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (_stream, peer) = listener.accept().await.unwrap();
        assert_eq!(peer.ip(), addr.ip());
        client.await.unwrap();
    }

    #[tokio::test]
    async fn rejects_unparseable_host() {
        let config = ListenerConfig {
            bind_host: "not-an-ip".into(),
        };
        assert!(matches!(
            Listener::bind(&config, 0).await,
            Err(ListenerError::Bind(_))
        ));
    }
}
