//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Minimal HTTP/1.1 request engine: URL parsing for `http(s)://` and
//! `ws(s)://`, a request writer, and a response reader built on
//! `BareBufReader` that reads the status line and headers a line at a
//! time and then the body via `Content-Length`. No chunked transfer
//! encoding, no keep-alive reuse, no redirects — each call is one
//! request on a caller-supplied transport.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::common::buf_read::BareBufReader;
use crate::{bare_err, BareResult, ErrorKind, Read, Write};

const MAX_HEADER_LINES: usize = 128;
const MAX_HOST_LEN: usize = 253;

pub struct Url {
    pub host: String,
    pub path: String,
    pub port: u16,
    pub secure: bool,
}

pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub struct Http;

impl Http {
    /// Parses `http://`, `https://`, `ws://` or `wss://` URLs into host,
    /// path, port and a secure flag. Port defaults to 443/80 for
    /// secure/plain schemes; path defaults to `/`.
    pub fn parse_url(url: &str) -> BareResult<Url> {
        let (rest, secure) = if let Some(r) = url.strip_prefix("https://") {
            (r, true)
        } else if let Some(r) = url.strip_prefix("wss://") {
            (r, true)
        } else if let Some(r) = url.strip_prefix("http://") {
            (r, false)
        } else if let Some(r) = url.strip_prefix("ws://") {
            (r, false)
        } else {
            return bare_err(ErrorKind::HttpParseUrlFailed, "unrecognized URL scheme");
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rfind(':') {
            Some(i) => {
                let port: u16 = authority[i + 1..]
                    .parse()
                    .map_err(|_| crate::bare_error(ErrorKind::HttpParseUrlFailed, "invalid port"))?;
                (&authority[..i], port)
            }
            None => (authority, if secure { 443 } else { 80 }),
        };

        if host.is_empty() || host.len() > MAX_HOST_LEN {
            return bare_err(ErrorKind::HttpParseUrlFailed, "host empty or too long");
        }

        Ok(Url {
            host: String::from(host),
            path: if path.is_empty() { String::from("/") } else { String::from(path) },
            port,
            secure,
        })
    }

    pub fn get<T: Read + Write>(mut transport: T, host: &str, path: &str) -> BareResult<HttpResponse> {
        let request = build_request("GET", host, path, None, &[]);
        transport.write_all(&request)?;
        read_response(transport)
    }

    pub fn post<T: Read + Write>(
        mut transport: T,
        host: &str,
        path: &str,
        content_type: &str,
        body: &[u8],
    ) -> BareResult<HttpResponse> {
        let request = build_request("POST", host, path, Some(content_type), body);
        transport.write_all(&request)?;
        read_response(transport)
    }
}

fn build_request(method: &str, host: &str, path: &str, content_type: Option<&str>, body: &[u8]) -> Vec<u8> {
    let mut req = Vec::with_capacity(128 + body.len());
    req.extend_from_slice(method.as_bytes());
    req.push(b' ');
    req.extend_from_slice(path.as_bytes());
    req.extend_from_slice(b" HTTP/1.1\r\n");
    req.extend_from_slice(b"Host: ");
    req.extend_from_slice(host.as_bytes());
    req.extend_from_slice(b"\r\n");

    if let Some(ct) = content_type {
        req.extend_from_slice(b"Content-Type: ");
        req.extend_from_slice(ct.as_bytes());
        req.extend_from_slice(b"\r\n");
        req.extend_from_slice(b"Content-Length: ");
        req.extend_from_slice(usize_to_ascii(body.len()).as_bytes());
        req.extend_from_slice(b"\r\n");
    }
    req.extend_from_slice(b"Connection: close\r\n");
    req.extend_from_slice(b"\r\n");
    req.extend_from_slice(body);
    req
}

fn usize_to_ascii(mut n: usize) -> String {
    if n == 0 {
        return String::from("0");
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(b'0' + (n % 10) as u8);
        n /= 10;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap()
}

/// Reads the status line and headers one line at a time via
/// `BareBufReader`, validates the `HTTP/1.1 <status>` status line,
/// extracts `Content-Length`, then reads exactly that many body bytes
/// through the same buffered reader so nothing read ahead into its
/// internal buffer is lost.
fn read_response<T: Read>(transport: T) -> BareResult<HttpResponse> {
    let mut reader = BareBufReader::new(transport);

    let mut status_line = String::new();
    reader.read_line(&mut status_line)?;
    let status_line = status_line.trim_end_matches(['\r', '\n']);
    if !status_line.starts_with("HTTP/1.1 ") {
        return bare_err(ErrorKind::HttpBadStatus, "missing HTTP/1.1 status line");
    }
    let status: u16 = status_line[9..12]
        .parse()
        .map_err(|_| crate::bare_error(ErrorKind::HttpBadStatus, "unparsable status code"))?;

    let mut content_length = 0usize;
    let mut saw_blank_line = false;
    for _ in 0..MAX_HEADER_LINES {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            saw_blank_line = true;
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length: ") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| crate::bare_error(ErrorKind::HttpBadHeader, "unparsable Content-Length"))?;
        }
    }
    if !saw_blank_line {
        return bare_err(ErrorKind::HttpBadHeader, "response has more than 128 header lines");
    }

    let mut body = alloc::vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_https_url_with_default_port() {
        let url = Http::parse_url("https://example.com/a/b").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.path, "/a/b");
        assert_eq!(url.port, 443);
        assert!(url.secure);
    }

    #[test]
    fn parse_ws_url_with_explicit_port_and_no_path() {
        let url = Http::parse_url("ws://example.com:9001").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.path, "/");
        assert_eq!(url.port, 9001);
        assert!(!url.secure);
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(Http::parse_url("ftp://example.com").is_err());
    }

    struct FakeTransport {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for FakeTransport {
        fn read(&mut self, buf: &mut [u8]) -> BareResult<usize> {
            let n = core::cmp::min(buf.len(), self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn reads_status_and_body_by_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello";
        let transport = FakeTransport { data: raw.to_vec(), pos: 0 };
        let response = read_response(transport).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello");
    }
}
