//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body for every GET path, with optional Range support,
//! a forced failure status, paced chunked writes, a missing Content-Length,
//! or a body cut short of its announced length.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Answer every request with this status and an empty body.
    pub fail_status: Option<u16>,
    /// Write the body in pieces of this size with `chunk_delay` between them.
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    /// Omit Content-Length and close the connection to end the body.
    pub omit_length: bool,
    /// Announce the full length but only send this many bytes.
    pub truncate_at: Option<usize>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            fail_status: None,
            chunk_size: 64 * 1024,
            chunk_delay: Duration::ZERO,
            omit_length: false,
            truncate_at: None,
        }
    }
}

pub struct TestServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Base URL with trailing slash, e.g. "http://127.0.0.1:12345/".
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` + `path` (no leading slash on `path`).
    pub fn file(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn body(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}

pub fn start(body: Vec<u8>) -> TestServer {
    start_with_options(body, ServerOptions::default())
}

/// Starts a server on a background thread; it runs until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: ServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    if let Some(code) = opts.fail_status {
        let response = format!(
            "HTTP/1.1 {} Test Failure\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            code
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let total = body.len() as u64;
    let (status, slice) = match range.filter(|_| opts.support_ranges) {
        Some((start, end_incl)) if start < total => {
            let end_excl = end_incl.saturating_add(1).min(total);
            ("206 Partial Content", &body[start as usize..end_excl as usize])
        }
        Some(_) => ("416 Range Not Satisfiable", &body[0..0]),
        None => ("200 OK", body),
    };

    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
    if !opts.omit_length {
        head.push_str(&format!("Content-Length: {}\r\n", slice.len()));
    }
    head.push_str("\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }

    let sent = opts.truncate_at.map_or(slice, |n| &slice[..n.min(slice.len())]);
    for piece in sent.chunks(opts.chunk_size.max(1)) {
        if !opts.chunk_delay.is_zero() {
            thread::sleep(opts.chunk_delay);
        }
        if stream.write_all(piece).is_err() {
            return;
        }
    }
    let _ = stream.flush();
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        let value = value.trim();
        if let Some(spec) = value.strip_prefix("bytes=") {
            if let Some((a, b)) = spec.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                range = Some((start, end));
            }
        }
    }
    (method, range)
}
