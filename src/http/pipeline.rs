//! Per-connection GET pipeline.
//!
//! # States
//! ```text
//! read request line
//!     → cache hit:  write cached bytes → done
//!     → cache miss: parse url → rewrite headers → connect origin
//!                   → send request → relay response → maybe store → done
//! ```
//!
//! Any failure ends the request: the error is returned to the connection
//! task, which logs it and closes the client socket. Nothing is synthesized
//! for the client and nothing is retried.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::cache::ObjectCache;
use crate::config::{ProxyConfig, UpstreamConfig};
use crate::error::{ProxyError, ProxyResult};
use crate::http::headers::{rewrite_headers, HeaderBlock};
use crate::http::request::{read_line, RequestLine};
use crate::http::url::ParsedUrl;
use crate::observability::metrics;

/// How a request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The client closed before sending a request line.
    NoRequest,
    /// Served from the cache without contacting the origin.
    CacheHit { bytes: usize },
    /// Relayed from the origin.
    Relayed { bytes: usize, cached: bool },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::NoRequest => "no_request",
            Outcome::CacheHit { .. } => "cache_hit",
            Outcome::Relayed { .. } => "relayed",
        }
    }
}

/// Await `connecting`, giving up with `TimedOut` once `limit` elapses.
async fn within<F, T>(limit: Option<Duration>, connecting: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, connecting)
            .await
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))),
        None => connecting.await,
    }
}

/// Shared, immutable request handling state.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    cache: Option<Arc<ObjectCache>>,
    upstream: UpstreamConfig,
}

impl RequestPipeline {
    /// Build a pipeline backed by `cache`. The cache is bypassed entirely when
    /// `config.cache.enabled` is false.
    pub fn new(config: &ProxyConfig, cache: Arc<ObjectCache>) -> Self {
        Self {
            cache: config.cache.enabled.then_some(cache),
            upstream: config.upstream.clone(),
        }
    }

    /// Handle one client connection from its request line to the end of the
    /// response.
    pub async fn handle<S>(&self, client: S) -> ProxyResult<Outcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, mut writer) = tokio::io::split(client);
        let mut reader = BufReader::new(read_half);

        let mut line = Vec::new();
        let n = read_line(&mut reader, &mut line, self.upstream.max_line_length)
            .await
            .map_err(ProxyError::ClientRead)?;
        if n == 0 {
            return Ok(Outcome::NoRequest);
        }

        let request = RequestLine::parse(&line)?;
        tracing::debug!(
            method = %request.method,
            target = %request.target,
            version = %request.version,
            "Request received"
        );

        if !request.is_get() {
            return Err(ProxyError::UnsupportedMethod(request.method));
        }

        self.serve_get(&mut reader, &mut writer, &request.target).await
    }

    async fn serve_get<R, W>(&self, reader: &mut R, client: &mut W, url: &str) -> ProxyResult<Outcome>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Some(cache) = &self.cache {
            if let Some(object) = cache.lookup(url).await {
                client.write_all(&object).await.map_err(ProxyError::ClientWrite)?;
                client.flush().await.map_err(ProxyError::ClientWrite)?;
                tracing::info!(url = %url, bytes = object.len(), "Served from cache");
                return Ok(Outcome::CacheHit { bytes: object.len() });
            }
        }

        let target = ParsedUrl::parse(url)?;
        let headers = rewrite_headers(
            reader,
            &target.host,
            &self.upstream.user_agent,
            self.upstream.max_line_length,
        )
        .await?;

        let mut origin = self.connect(&target).await?;
        let result = self.exchange(&mut origin, &target, &headers, client, url).await;
        // Closed on every path; a failed shutdown changes nothing for the client.
        let _ = origin.shutdown().await;
        result
    }

    async fn connect(&self, target: &ParsedUrl) -> ProxyResult<TcpStream> {
        let connect_error = |source: io::Error| ProxyError::UpstreamConnect {
            host: target.host.clone(),
            port: target.port.clone(),
            source,
        };

        let port: u16 = target.port.parse().map_err(|_| {
            connect_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid port {:?}", target.port),
            ))
        })?;

        let limit = self.upstream.connect_timeout_secs.map(Duration::from_secs);
        let stream = within(limit, TcpStream::connect((target.host.as_str(), port)))
            .await
            .map_err(connect_error)?;

        tracing::debug!(host = %target.host, port, "Connected to origin");
        Ok(stream)
    }

    /// Send the rewritten request and stream the response back, buffering it
    /// for the cache while it still fits.
    async fn exchange<O, W>(
        &self,
        origin: &mut O,
        target: &ParsedUrl,
        headers: &HeaderBlock,
        client: &mut W,
        url: &str,
    ) -> ProxyResult<Outcome>
    where
        O: AsyncRead + AsyncWrite + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut request = Vec::with_capacity(target.path.len() + headers.len() + 16);
        request.extend_from_slice(b"GET ");
        request.extend_from_slice(target.path.as_bytes());
        request.extend_from_slice(b" HTTP/1.0\r\n");
        request.extend_from_slice(headers.as_bytes());
        origin.write_all(&request).await.map_err(ProxyError::UpstreamWrite)?;

        let limit = self.cache.as_ref().map_or(0, |cache| cache.max_object_size());
        let mut buffered = BytesMut::with_capacity(limit.min(self.upstream.relay_chunk_size * 4));
        let mut chunk = vec![0u8; self.upstream.relay_chunk_size];
        let mut total = 0usize;

        loop {
            let n = origin.read(&mut chunk).await.map_err(ProxyError::UpstreamRead)?;
            if n == 0 {
                break;
            }
            let received = &chunk[..n];
            if total + n <= limit {
                buffered.extend_from_slice(received);
            }
            total += n;
            client.write_all(received).await.map_err(ProxyError::ClientWrite)?;
        }
        client.flush().await.map_err(ProxyError::ClientWrite)?;
        metrics::record_relayed_bytes(total);

        let cached = match &self.cache {
            Some(cache) if total <= limit => {
                cache.store(url, buffered.freeze()).await;
                true
            }
            _ => false,
        };

        tracing::info!(url = %url, bytes = total, cached, "Relayed response");
        Ok(Outcome::Relayed { bytes: total, cached })
    }
}
