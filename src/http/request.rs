//! Client request line handling.
//!
//! # Responsibilities
//! - Read CRLF-terminated lines with a hard length limit
//! - Split the request line into method, target and version
//!
//! # Design Decisions
//! - Lines are bytes; nothing is decoded until a token is needed
//! - A line longer than the limit is an error, never silently truncated

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{ProxyError, ProxyResult};

/// Read one line (terminator included) into `buf`, reading at most `limit`
/// bytes. Returns the number of bytes read; `0` means end of stream.
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader).take(limit as u64).read_until(b'\n', buf).await?;
    if n == limit && buf.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line exceeds {limit} bytes"),
        ));
    }
    Ok(n)
}

/// The three tokens of an HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

impl RequestLine {
    /// Parse a raw request line. Exactly three whitespace-separated tokens are
    /// required.
    pub fn parse(line: &[u8]) -> ProxyResult<Self> {
        let text = String::from_utf8_lossy(line);
        let mut tokens = text.split_whitespace();

        match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(target), Some(version), None) => Ok(Self {
                method: method.to_string(),
                target: target.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ProxyError::MalformedRequest(text.trim_end().to_string())),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn parses_three_tokens() {
        let line = RequestLine::parse(b"GET http://example.com/index.html HTTP/1.1\r\n").unwrap();
        assert_eq!(line.method, "GET");
        assert_eq!(line.target, "http://example.com/index.html");
        assert_eq!(line.version, "HTTP/1.1");
        assert!(line.is_get());
    }

    #[test]
    fn method_match_is_case_insensitive() {
        assert!(RequestLine::parse(b"get http://h/ HTTP/1.0\r\n").unwrap().is_get());
        assert!(!RequestLine::parse(b"POST http://h/ HTTP/1.0\r\n").unwrap().is_get());
    }

    #[test]
    fn rejects_wrong_token_count() {
        let lines: [&[u8]; 4] = [
            b"GET http://h/\r\n",
            b"GET\r\n",
            b"\r\n",
            b"GET http://h/ HTTP/1.0 extra\r\n",
        ];
        for line in lines {
            assert!(matches!(
                RequestLine::parse(line),
                Err(ProxyError::MalformedRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn reads_successive_lines() {
        let mut reader = BufReader::new(&b"first\r\nsecond\r\n"[..]);
        let mut buf = Vec::new();

        assert_eq!(read_line(&mut reader, &mut buf, 64).await.unwrap(), 7);
        assert_eq!(buf, b"first\r\n");
        assert_eq!(read_line(&mut reader, &mut buf, 64).await.unwrap(), 8);
        assert_eq!(buf, b"second\r\n");
        assert_eq!(read_line(&mut reader, &mut buf, 64).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_overlong_line() {
        let mut reader = BufReader::new(&b"0123456789\r\n"[..]);
        let mut buf = Vec::new();
        let err = read_line(&mut reader, &mut buf, 8).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn line_exactly_at_limit_is_accepted() {
        let mut reader = BufReader::new(&b"abcdef\r\n"[..]);
        let mut buf = Vec::new();
        assert_eq!(read_line(&mut reader, &mut buf, 8).await.unwrap(), 8);
    }
}
