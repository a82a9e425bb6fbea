//! Failure taxonomy for a download request.

use thiserror::Error;

use crate::transport::TransportError;

/// Category of a failure, for status display and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or unparseable URL.
    InvalidInput,
    /// Host or path not on the allow-list.
    PolicyRejected,
    /// Another download is running on the same orchestrator.
    Busy,
    /// A mirror probe failed. Recorded per mirror; never ends a request.
    ProbeFailure,
    /// Non-2xx status, network error, short body or save failure.
    TransferFailure,
    /// The caller cancelled.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    PolicyRejected(String),
    #[error("a download is already in progress")]
    Busy,
    #[error("{0}")]
    Transport(#[source] TransportError),
    #[error("premature end of stream: received {received} of {expected} bytes")]
    PrematureEnd { expected: u64, received: u64 },
    #[error("save failed: {0}")]
    Save(#[source] std::io::Error),
    #[error("cancelled")]
    Cancelled,
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::InvalidInput(_) => ErrorKind::InvalidInput,
            DownloadError::PolicyRejected(_) => ErrorKind::PolicyRejected,
            DownloadError::Busy => ErrorKind::Busy,
            DownloadError::Cancelled => ErrorKind::Cancelled,
            DownloadError::Transport(_)
            | DownloadError::PrematureEnd { .. }
            | DownloadError::Save(_) => ErrorKind::TransferFailure,
        }
    }
}

impl From<TransportError> for DownloadError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Cancelled => DownloadError::Cancelled,
            other => DownloadError::Transport(other),
        }
    }
}
