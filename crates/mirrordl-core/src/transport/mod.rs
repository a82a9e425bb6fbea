//! HTTP GET seam used by mirror probes and the main transfer.
//!
//! Body bytes are pushed into a [`BodySink`] as they arrive, matching how
//! libcurl delivers data. Everything above this module talks to
//! `dyn Transport`, so tests can substitute scripted responses.

mod curl;
mod error;
mod head;

pub use self::curl::CurlTransport;
pub use error::TransportError;
pub use head::ResponseHead;

use crate::cancel::CancelToken;
use std::time::Duration;

/// Inclusive byte range for a `Range: bytes=start-end` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end_inclusive: u64,
}

impl ByteRange {
    /// The first `len` bytes of the resource. `len` must be > 0.
    pub fn first(len: u64) -> Self {
        Self {
            start: 0,
            end_inclusive: len.saturating_sub(1),
        }
    }

    pub fn len(&self) -> u64 {
        self.end_inclusive.saturating_sub(self.start) + 1
    }

    /// Range spec as libcurl expects it (`"start-end"`, no `bytes=` prefix).
    pub fn curl_spec(&self) -> String {
        format!("{}-{}", self.start, self.end_inclusive)
    }
}

/// One GET request.
#[derive(Debug, Clone)]
pub struct GetRequest<'a> {
    pub url: &'a str,
    pub range: Option<ByteRange>,
    /// Wall-clock limit for the whole request, body included.
    pub timeout: Option<Duration>,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> GetRequest<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            range: None,
            timeout: None,
            cancel: None,
        }
    }

    pub fn range(mut self, range: ByteRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.is_cancelled())
    }
}

/// Whether the sink wants more body bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Receiver for a successful (2xx) response.
pub trait BodySink {
    /// Called exactly once, before any `chunk`, even for an empty body.
    fn head(&mut self, head: &ResponseHead) -> Flow;
    fn chunk(&mut self, data: &[u8]) -> Flow;
}

pub trait Transport: Send + Sync {
    /// Performs a GET and streams the body into `sink`.
    ///
    /// Non-2xx responses are returned as [`TransportError::Http`] without
    /// touching the sink. A sink that returns [`Flow::Stop`] ends the
    /// transfer with [`TransportError::Stopped`]; a cancelled token ends it
    /// with [`TransportError::Cancelled`].
    fn get(&self, request: &GetRequest<'_>, sink: &mut dyn BodySink)
        -> Result<ResponseHead, TransportError>;
}
