//! Terminal result of one download request.

use std::path::PathBuf;

use crate::error::{DownloadError, ErrorKind};
use crate::mirror::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub status: OutcomeStatus,
    pub bytes_transferred: u64,
    pub elapsed_ms: f64,
    pub error_detail: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// URL the transfer actually used (a mirror's URL in mirror mode).
    pub transfer_url: Option<String>,
    /// Where the artifact was saved.
    pub saved_as: Option<PathBuf>,
    /// On failure: the requested URL, for the user to open by hand.
    pub manual_fallback_url: Option<String>,
    /// Mirror probing results, in mirror mode.
    pub selection: Option<Selection>,
}

impl DownloadOutcome {
    pub(crate) fn succeeded(bytes: u64, elapsed_ms: f64, transfer_url: &str, saved_as: PathBuf) -> Self {
        Self {
            status: OutcomeStatus::Succeeded,
            bytes_transferred: bytes,
            elapsed_ms,
            error_detail: None,
            error_kind: None,
            transfer_url: Some(transfer_url.to_string()),
            saved_as: Some(saved_as),
            manual_fallback_url: None,
            selection: None,
        }
    }

    pub(crate) fn failed(err: &DownloadError, bytes: u64, elapsed_ms: f64, transfer_url: &str) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            bytes_transferred: bytes,
            elapsed_ms,
            error_detail: Some(err.to_string()),
            error_kind: Some(err.kind()),
            transfer_url: Some(transfer_url.to_string()),
            saved_as: None,
            manual_fallback_url: Some(transfer_url.to_string()),
            selection: None,
        }
    }

    pub(crate) fn rejected(err: &DownloadError) -> Self {
        Self {
            status: OutcomeStatus::Rejected,
            bytes_transferred: 0,
            elapsed_ms: 0.0,
            error_detail: Some(err.to_string()),
            error_kind: Some(err.kind()),
            transfer_url: None,
            saved_as: None,
            manual_fallback_url: None,
            selection: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    /// One-line, user-facing description of the outcome.
    pub fn status_line(&self) -> String {
        let detail = self.error_detail.as_deref().unwrap_or("unknown error");
        match self.status {
            OutcomeStatus::Succeeded => "Download completed successfully!".to_string(),
            OutcomeStatus::Rejected => format!("Error: {}", detail),
            OutcomeStatus::Failed => match &self.manual_fallback_url {
                Some(url) => format!("Download failed: {}. Try opening {} directly.", detail, url),
                None => format!("Download failed: {}.", detail),
            },
        }
    }
}
