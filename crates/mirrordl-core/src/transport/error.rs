//! Transport-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded its wall-clock limit.
    #[error("timeout")]
    TimedOut,
    /// The final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The body sink asked for no more data.
    #[error("stopped by receiver")]
    Stopped,
    /// The request's cancel token fired.
    #[error("cancelled")]
    Cancelled,
    /// Connection, DNS, TLS or protocol failure reported by libcurl.
    #[error("{0}")]
    Curl(#[source] curl::Error),
}

impl TransportError {
    /// Maps a libcurl error, folding timeouts into [`TransportError::TimedOut`].
    pub(crate) fn from_curl(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            TransportError::TimedOut
        } else {
            TransportError::Curl(e)
        }
    }
}
