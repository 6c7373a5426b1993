//! Per-request error taxonomy.
//!
//! Every variant is local to one connection task: it is logged once at the
//! connection boundary and the client connection is closed without a
//! synthesized response.

use thiserror::Error;

/// Failure of a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request line did not split into exactly three tokens.
    #[error("malformed request line: {0:?}")]
    MalformedRequest(String),

    /// Any method other than GET.
    #[error("method not implemented: {0}")]
    UnsupportedMethod(String),

    /// The target did not start with `http://`.
    #[error("only the http scheme is supported: {0}")]
    UnsupportedScheme(String),

    /// No `/` after the host portion.
    #[error("malformed url (no path separator): {0}")]
    MalformedUrl(String),

    /// Reading the request or header lines from the client failed.
    #[error("failed to read from client: {0}")]
    ClientRead(#[source] std::io::Error),

    #[error("connection to {host}:{port} failed: {source}")]
    UpstreamConnect {
        host: String,
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("forwarding request to origin failed: {0}")]
    UpstreamWrite(#[source] std::io::Error),

    #[error("reading response from origin failed: {0}")]
    UpstreamRead(#[source] std::io::Error),

    #[error("writing response to client failed: {0}")]
    ClientWrite(#[source] std::io::Error),
}

impl ProxyError {
    /// Short label used as a structured log field and metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MalformedRequest(_) => "malformed_request",
            ProxyError::UnsupportedMethod(_) => "unsupported_method",
            ProxyError::UnsupportedScheme(_) => "unsupported_scheme",
            ProxyError::MalformedUrl(_) => "malformed_url",
            ProxyError::ClientRead(_) => "client_read",
            ProxyError::UpstreamConnect { .. } => "upstream_connect",
            ProxyError::UpstreamWrite(_) => "upstream_write",
            ProxyError::UpstreamRead(_) => "upstream_read",
            ProxyError::ClientWrite(_) => "client_write",
        }
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
