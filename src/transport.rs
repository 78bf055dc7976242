//! Transport boundary.
//!
//! Once dispatch produces a finished [`Response`](crate::core::Response),
//! it is handed to a [`Transport`] which owns the wire format: one status
//! line, one line per header, then the raw body bytes. Nothing is emitted
//! twice; a raw scalar controller result skips the response path and is
//! written as the whole body under the implicit default status.

use std::io::{self, Write};

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

/// Boundary that receives a finished response.
pub trait Transport {
    /// Whether the status line has already been written.
    fn sent(&self) -> bool;

    /// Emit the status line. Ignored after the first call.
    fn send_status(&mut self, status: StatusCode);

    /// Emit one header line.
    fn send_header(&mut self, name: &HeaderName, value: &HeaderValue);

    /// Emit body bytes. Implies the implicit default status (200) when no
    /// status line has been sent.
    fn send_body(&mut self, body: &[u8]);
}

/// Transport writing HTTP/1.1 wire format to an [`io::Write`] sink.
pub struct WireTransport<W: Write> {
    sink: W,
    sent: bool,
    in_body: bool,
}

impl<W: Write> WireTransport<W> {
    /// Wrap a writer.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            sent: false,
            in_body: false,
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_all(&mut self, bytes: &[u8]) {
        // transport write failures are not recoverable mid-response
        if let Err(e) = self.sink.write_all(bytes) {
            tracing::warn!(error = %e, "transport write failed");
        }
    }
}

impl<W: Write> Transport for WireTransport<W> {
    fn sent(&self) -> bool {
        self.sent
    }

    fn send_status(&mut self, status: StatusCode) {
        if self.sent {
            return;
        }
        self.sent = true;
        let line = format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error")
        );
        self.write_all(line.as_bytes());
    }

    fn send_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        if self.in_body {
            return;
        }
        let line = format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
        self.write_all(line.as_bytes());
    }

    fn send_body(&mut self, body: &[u8]) {
        if !self.sent {
            self.send_status(StatusCode::OK);
        }
        if !self.in_body {
            self.in_body = true;
            self.write_all(b"\r\n");
        }
        self.write_all(body);
    }
}

/// In-memory transport capturing emitted output, for embedding and tests.
#[derive(Default)]
pub struct BufferTransport {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl BufferTransport {
    /// Create an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured status, if any output was emitted.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Captured header lines in emission order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a captured header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The captured body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The captured body as text.
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Transport for BufferTransport {
    fn sent(&self) -> bool {
        self.status.is_some()
    }

    fn send_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn send_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        self.headers.push((
            name.to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        ));
    }

    fn send_body(&mut self, body: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(body);
    }
}

/// Transport writing to standard output.
pub fn stdout() -> WireTransport<io::Stdout> {
    WireTransport::new(io::stdout())
}
