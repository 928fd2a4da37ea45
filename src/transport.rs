use std::io::{BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::{Result, ScalarisError};

/// Upper bound on a response, head included.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// A raw HTTP answer: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, already de-chunked.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request body to a URL and hands back the raw answer.
///
/// Implementations must be safe to share between threads; the client
/// never serializes access to its transport.
pub trait Transport: Send + Sync {
    /// POSTs `body` to `url` with the given content type.
    fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Result<HttpResponse>;
}

/// Plain HTTP/1.1 over a fresh `TcpStream` per request.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport that bounds connect, read and write by `timeout`.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn connect(&self, authority: &str) -> Result<TcpStream> {
        let stream = match self.timeout {
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in authority.to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match (connected, last_err) {
                    (Some(stream), _) => stream,
                    (None, Some(e)) => return Err(e.into()),
                    (None, None) => {
                        return Err(ScalarisError::Connection(format!(
                            "no address for {}",
                            authority
                        )))
                    }
                }
            }
            None => TcpStream::connect(authority)?,
        };
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(stream)
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Result<HttpResponse> {
        let (authority, path) = split_url(url)?;
        let mut stream = self.connect(&authority)?;
        debug!("POST {} ({} bytes)", url, body.len());

        {
            let mut writer = BufWriter::new(&stream);
            write!(
                writer,
                "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nAccept: application/json\r\nConnection: close\r\n\r\n",
                path,
                authority,
                content_type,
                body.len()
            )?;
            writer.write_all(body)?;
            writer.flush()?;
        }

        let raw = read_capped(&mut stream, MAX_RESPONSE_BYTES)?;
        parse_response(&raw)
    }
}

/// Splits `http://host[:port]/path` into `("host:port", "/path")`.
fn split_url(url: &str) -> Result<(String, String)> {
    let rest = url
        .strip_prefix("http://")
        .ok_or_else(|| ScalarisError::Connection(format!("unsupported url: {}", url)))?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    if authority.is_empty() {
        return Err(ScalarisError::Connection(format!("missing host in {}", url)));
    }
    let authority = if authority.contains(':') {
        authority.to_owned()
    } else {
        format!("{}:80", authority)
    };
    Ok((authority, path.to_owned()))
}

/// Reads until EOF, failing once more than `limit` bytes arrive.
fn read_capped<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    reader.take(limit + 1).read_to_end(&mut raw)?;
    if raw.len() as u64 > limit {
        return Err(ScalarisError::Connection(format!(
            "response larger than {} bytes",
            limit
        )));
    }
    Ok(raw)
}

fn malformed(what: &str) -> ScalarisError {
    ScalarisError::Connection(format!("malformed HTTP response: {}", what))
}

fn parse_response(raw: &[u8]) -> Result<HttpResponse> {
    let head_end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| malformed("no header terminator"))?;
    let head = std::str::from_utf8(&raw[..head_end]).map_err(|_| malformed("non-utf8 head"))?;
    let rest = &raw[head_end + 4..];

    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| malformed("bad status line"))?;

    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(
                value
                    .parse::<usize>()
                    .map_err(|_| malformed("bad content-length"))?,
            );
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.to_ascii_lowercase().contains("chunked");
        }
    }

    let body = if chunked {
        dechunk(rest)?
    } else if let Some(len) = content_length {
        if rest.len() < len {
            return Err(malformed("truncated body"));
        }
        rest[..len].to_vec()
    } else {
        rest.to_vec()
    };

    Ok(HttpResponse { status, body })
}

fn dechunk(mut data: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let line_end = data
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| malformed("bad chunk header"))?;
        let size_line =
            std::str::from_utf8(&data[..line_end]).map_err(|_| malformed("bad chunk header"))?;
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size =
            usize::from_str_radix(size_hex, 16).map_err(|_| malformed("bad chunk size"))?;
        data = &data[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        let end = size
            .checked_add(2)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| malformed("truncated chunk"))?;
        body.extend_from_slice(&data[..size]);
        data = &data[end..];
    }
}
