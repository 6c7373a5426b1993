//! Absolute-form request target parsing.
//!
//! Only `http://host[:port]/path` targets are accepted. The port is kept as
//! text, exactly as the client wrote it; it is turned into a number only when
//! the origin connection is opened.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProxyError, ProxyResult};

const HTTP_PREFIX: &str = "http://";
const DEFAULT_PORT: &str = "80";

/// Origin coordinates extracted from a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub host: String,
    pub port: String,
    /// Always starts with `/`.
    pub path: String,
}

impl ParsedUrl {
    /// Split `url` into host, port and path.
    ///
    /// The scheme is matched case-insensitively. A `:` only separates a port
    /// when it appears before the first `/`.
    pub fn parse(url: &str) -> ProxyResult<Self> {
        let rest = match url.get(..HTTP_PREFIX.len()) {
            Some(scheme) if scheme.eq_ignore_ascii_case(HTTP_PREFIX) => &url[HTTP_PREFIX.len()..],
            _ => return Err(ProxyError::UnsupportedScheme(url.to_string())),
        };

        let slash = rest
            .find('/')
            .ok_or_else(|| ProxyError::MalformedUrl(url.to_string()))?;
        let (authority, path) = rest.split_at(slash);

        let (host, port) = authority.split_once(':').unwrap_or((authority, DEFAULT_PORT));

        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
            path: path.to_string(),
        })
    }
}

impl FromStr for ParsedUrl {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}{}", HTTP_PREFIX, self.host, self.port, self.path)
    }
}
