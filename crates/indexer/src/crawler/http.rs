//! Minimal HTTP/1.1 GET over a plain TCP socket.

use super::CrawlerConfig;
use crate::error::{IndexerError, Result};
use log::warn;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};
use url::Url;

const HTTP_VERSION: &str = "HTTP/1.1";
const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    status: Option<String>,
    headers: Vec<(String, String)>,
    body: String,
}

impl HttpResponse {
    /// Status line after the protocol version, e.g. `200 OK`.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// First header named `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn is_html(&self) -> bool {
        self.header("Content-Type")
            .is_some_and(|value| value.to_ascii_lowercase().contains("html"))
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Request text for `url`, closing the connection after the response.
#[must_use]
pub fn request_for(url: &Url, user_agent: &str) -> String {
    let host = url.host_str().unwrap_or_default();
    let host = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    format!(
        "GET {target} {HTTP_VERSION}\r\nHost: {host}\r\nUser-Agent: {user_agent}\r\nConnection: close\r\n\r\n"
    )
}

/// Fetches `url` and returns its parsed response.
///
/// Connecting is bounded by the connect timeout. The whole response must
/// arrive within the read timeout, and at most `max_response_bytes` of it are
/// kept; a longer response is truncated.
pub fn fetch(url: &Url, config: &CrawlerConfig) -> Result<HttpResponse> {
    let wrap = |source| IndexerError::Fetch {
        url: url.to_string(),
        source,
    };

    let addrs = socket_addrs(url).map_err(wrap)?;
    let mut stream = connect(&addrs, config.connect_timeout).map_err(wrap)?;
    stream
        .set_write_timeout(Some(config.read_timeout))
        .map_err(wrap)?;
    stream
        .write_all(request_for(url, &config.user_agent).as_bytes())
        .map_err(wrap)?;
    stream.flush().map_err(wrap)?;

    let deadline = Instant::now() + config.read_timeout;
    let raw = read_response(&stream, deadline, config.max_response_bytes).map_err(wrap)?;
    if raw.len() as u64 >= config.max_response_bytes {
        warn!("truncated {url} at {} bytes", config.max_response_bytes);
    }
    parse_response(&raw)
}

/// Socket addresses for `url`, defaulting to port 80. IPv6 literals are
/// resolved without their brackets.
pub fn socket_addrs(url: &Url) -> std::io::Result<Vec<SocketAddr>> {
    if url.host().is_none() {
        return Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("no host in {url}"),
        ));
    }
    url.socket_addrs(|| Some(DEFAULT_PORT))
}

fn connect(addrs: &[SocketAddr], timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::NotFound, "no address to connect to")
    }))
}

/// Reads until EOF, `limit` bytes or `deadline`, whichever comes first.
/// Hitting the deadline is an error.
fn read_response(
    stream: &TcpStream,
    deadline: Instant,
    limit: u64,
) -> std::io::Result<Vec<u8>> {
    let mut body = stream.take(limit);
    let mut raw = Vec::new();
    let mut chunk = [0_u8; 8192];

    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
            .ok_or_else(|| {
                std::io::Error::new(
                    ErrorKind::TimedOut,
                    "response not complete before deadline",
                )
            })?;
        body.get_ref().set_read_timeout(Some(remaining))?;

        match body.read(&mut chunk) {
            Ok(0) => return Ok(raw),
            Ok(read) => raw.extend_from_slice(&chunk[..read]),
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
}

/// Splits a raw response into status, headers and body at the first blank
/// line.
///
/// A first line that is not an HTTP status line yields no headers, so the
/// response is treated as non-HTML. Chunked bodies are decoded.
pub fn parse_response(raw: &[u8]) -> Result<HttpResponse> {
    let (head, body) = split_head(raw);
    let head = String::from_utf8_lossy(head);
    let mut lines = head.lines();

    let mut response = HttpResponse::default();
    let Some(status_line) = lines.next() else {
        return Ok(response);
    };
    if let Some(rest) = status_line.strip_prefix("HTTP/") {
        let status = rest.split_once(' ').map_or("", |(_, status)| status);
        response.status = Some(status.trim().to_string());
        response.headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
    }

    let chunked = response
        .header("Transfer-Encoding")
        .is_some_and(|value| value.eq_ignore_ascii_case("chunked"));
    let body = if chunked {
        decode_chunked(body)?
    } else {
        body.to_vec()
    };
    response.body = String::from_utf8_lossy(&body).into_owned();
    Ok(response)
}

fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    let mut start = 0;
    while start < raw.len() {
        let end = raw[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(raw.len(), |offset| start + offset + 1);
        if raw[start..end].iter().all(u8::is_ascii_whitespace) {
            return (&raw[..start], &raw[end..]);
        }
        start = end;
    }
    (raw, &raw[raw.len()..])
}

fn decode_chunked(mut body: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(body.len());
    loop {
        let line_end = body
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| IndexerError::MalformedResponse("truncated chunk header".into()))?;
        let size_line = String::from_utf8_lossy(&body[..line_end]);
        let size_text = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_text, 16).map_err(|_| {
            IndexerError::MalformedResponse(format!("invalid chunk size {size_text:?}"))
        })?;
        body = &body[line_end + 1..];

        if size == 0 {
            return Ok(decoded);
        }
        if body.len() < size {
            return Err(IndexerError::MalformedResponse("truncated chunk".into()));
        }
        decoded.extend_from_slice(&body[..size]);
        body = &body[size..];
        body = body.strip_prefix(b"\r\n").unwrap_or(body);
        body = body.strip_prefix(b"\n").unwrap_or(body);
    }
}
