//! Request header rewriting for the origin hop.
//!
//! # Responsibilities
//! - Forward client headers in their original order
//! - Drop `Connection`, `Proxy-Connection` and `User-Agent`; fixed values replace them
//! - Synthesize `Host` when the client did not send one
//!
//! # Design Decisions
//! - Header names are matched case-insensitively on the raw line prefix
//! - The output is a growable byte buffer; lines are appended, never copied
//!   into fixed storage
//! - The client's blank line is consumed and replaced by our own terminator

use std::fmt;

use tokio::io::AsyncBufRead;

use crate::error::{ProxyError, ProxyResult};
use crate::http::request::read_line;

const TERMINATOR: &[u8] = b"\r\n";

/// Headers that are always replaced by fixed values.
const REPLACED: [&[u8]; 3] = [b"Connection:", b"Proxy-Connection:", b"User-Agent:"];

fn has_prefix_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// A complete, blank-line terminated header block ready to follow the
/// upstream request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock(Vec<u8>);

impl HeaderBlock {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Individual header lines, CRLF included, terminator excluded.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.0
            .split_inclusive(|b| *b == b'\n')
            .filter(|line| *line != TERMINATOR)
    }
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// What happened to a line fed to [`HeaderRewriter::push_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDisposition {
    Forwarded,
    Dropped,
    /// The blank line ending the client's headers.
    End,
}

/// Incremental header rewriter. Feed it client lines, then `finish`.
#[derive(Debug)]
pub struct HeaderRewriter<'a> {
    block: Vec<u8>,
    saw_host: bool,
    user_agent: &'a str,
}

impl<'a> HeaderRewriter<'a> {
    pub fn new(user_agent: &'a str) -> Self {
        Self {
            block: Vec::new(),
            saw_host: false,
            user_agent,
        }
    }

    /// Process one raw client line (terminator included).
    pub fn push_line(&mut self, line: &[u8]) -> LineDisposition {
        if line == TERMINATOR {
            return LineDisposition::End;
        }
        if has_prefix_ignore_case(line, b"Host:") {
            self.saw_host = true;
        }
        if REPLACED.iter().any(|name| has_prefix_ignore_case(line, name)) {
            return LineDisposition::Dropped;
        }
        self.block.extend_from_slice(line);
        LineDisposition::Forwarded
    }

    /// Append the defaults and the terminator. `host` is used only when the
    /// client sent no `Host` header.
    pub fn finish(mut self, host: &str) -> HeaderBlock {
        if !self.saw_host {
            self.push_header("Host", host);
        }
        self.push_header("Connection", "close");
        self.push_header("Proxy-Connection", "close");
        let user_agent = self.user_agent;
        self.push_header("User-Agent", user_agent);
        self.block.extend_from_slice(TERMINATOR);
        HeaderBlock(self.block)
    }

    fn push_header(&mut self, name: &str, value: &str) {
        self.block.extend_from_slice(name.as_bytes());
        self.block.extend_from_slice(b": ");
        self.block.extend_from_slice(value.as_bytes());
        self.block.extend_from_slice(TERMINATOR);
    }
}

/// Read the client's remaining header lines up to the blank line and rewrite
/// them for the origin.
///
/// End of stream before the blank line is a `ClientRead` error.
pub async fn rewrite_headers<R>(
    reader: &mut R,
    host: &str,
    user_agent: &str,
    max_line_length: usize,
) -> ProxyResult<HeaderBlock>
where
    R: AsyncBufRead + Unpin,
{
    let mut rewriter = HeaderRewriter::new(user_agent);
    let mut line = Vec::new();

    loop {
        let n = read_line(reader, &mut line, max_line_length)
            .await
            .map_err(ProxyError::ClientRead)?;
        if n == 0 {
            return Err(ProxyError::ClientRead(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "client closed before end of headers",
            )));
        }
        if rewriter.push_line(&line) == LineDisposition::End {
            break;
        }
    }

    Ok(rewriter.finish(host))
}
