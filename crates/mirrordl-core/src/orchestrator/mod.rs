//! Drives one download request from validation to outcome.
//!
//! `Idle → Validating → (Rejected | Probing) → Downloading → (Succeeded | Failed)`,
//! with Probing skipped in single-target mode. One orchestrator runs one
//! request at a time; a submission that arrives while another is in flight is
//! rejected and the running one is left alone.

mod guard;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use url::Url;

use crate::cancel::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::config::MirrordlConfig;
use crate::domain_policy::{self, Verdict};
use crate::downloader::ProgressiveDownloader;
use crate::error::DownloadError;
use crate::filename::derive_filename;
use crate::mirror::{self, Selection};
use crate::outcome::DownloadOutcome;
use crate::progress::ProgressSnapshot;
use crate::request::DownloadRequest;
use crate::save::ArtifactSink;
use crate::transport::{CurlTransport, Transport};

use guard::BusyGuard;
pub use state::OrchestratorState;

/// Called on every state change.
pub type StateObserver = Box<dyn Fn(OrchestratorState) + Send + Sync>;

pub struct DownloadOrchestrator {
    config: MirrordlConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    busy: AtomicBool,
    state: Mutex<OrchestratorState>,
    observer: Option<StateObserver>,
}

impl DownloadOrchestrator {
    pub fn new(config: MirrordlConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            transport,
            clock,
            busy: AtomicBool::new(false),
            state: Mutex::new(OrchestratorState::Idle),
            observer: None,
        }
    }

    /// Orchestrator on libcurl and the system clock.
    pub fn with_curl(config: MirrordlConfig) -> Self {
        let transport = Arc::new(CurlTransport::new(config.connect_timeout()));
        Self::new(config, transport, Arc::new(SystemClock))
    }

    pub fn observe(mut self, observer: impl Fn(OrchestratorState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &MirrordlConfig {
        &self.config
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Probes the configured mirrors for `path` and picks one.
    /// None when there are no mirrors to probe.
    pub fn select_mirror(&self, path: &str) -> Option<Selection> {
        let fallback = self.config.fallback()?;
        Some(mirror::select(
            self.transport.as_ref(),
            self.clock.as_ref(),
            &self.config.mirrors,
            path,
            fallback,
            &self.config.probe,
        ))
    }

    /// Runs `request` to completion on the calling thread.
    ///
    /// Never returns an error: every failure ends up in the outcome, with a
    /// status line fit for the user.
    pub fn submit(
        &self,
        request: &DownloadRequest,
        on_progress: &mut dyn FnMut(&ProgressSnapshot),
        cancel: &CancelToken,
        sink: &mut dyn ArtifactSink,
    ) -> DownloadOutcome {
        let _guard = match BusyGuard::acquire(&self.busy) {
            Some(g) => g,
            None => {
                tracing::warn!(url = %request.source_url, "submission rejected: orchestrator busy");
                return DownloadOutcome::rejected(&DownloadError::Busy);
            }
        };

        self.set_state(OrchestratorState::Validating);
        let source_url = request.source_url.trim();
        let parsed = match self.validate(source_url) {
            Ok(u) => u,
            Err(err) => {
                tracing::warn!(url = source_url, error = %err, "request rejected");
                self.set_state(OrchestratorState::Rejected);
                return DownloadOutcome::rejected(&err);
            }
        };

        let mut selection = None;
        let mut transfer_url = source_url.to_string();
        if self.config.mirror_selection_enabled {
            if self.config.fallback().is_some() {
                self.set_state(OrchestratorState::Probing);
                if let Some(sel) = self.select_mirror(&mirror_path(&parsed)) {
                    transfer_url = sel.resolved_url.clone();
                    selection = Some(sel);
                }
            } else {
                tracing::warn!("mirror selection enabled but no mirrors configured; downloading directly");
            }
        }

        let filename = derive_filename(source_url, request.suggested_filename.as_deref());
        self.set_state(OrchestratorState::Downloading);
        let downloader = ProgressiveDownloader::new(
            self.transport.as_ref(),
            self.clock.as_ref(),
            self.config.progress_interval(),
        );
        let mut outcome = downloader.download(&transfer_url, on_progress, cancel, sink, &filename);

        if outcome.is_success() {
            self.set_state(OrchestratorState::Succeeded);
        } else {
            outcome.manual_fallback_url = Some(source_url.to_string());
            self.set_state(OrchestratorState::Failed);
        }
        outcome.selection = selection;
        outcome
    }

    fn validate(&self, url: &str) -> Result<Url, DownloadError> {
        if url.is_empty() {
            return Err(DownloadError::InvalidInput("Please provide a URL.".to_string()));
        }
        let parsed =
            Url::parse(url).map_err(|_| DownloadError::InvalidInput("invalid url".to_string()))?;
        match domain_policy::validate(url, &self.config.allowed_domains) {
            Verdict::Allowed => Ok(parsed),
            Verdict::Rejected(reason) => Err(DownloadError::PolicyRejected(reason)),
        }
    }

    fn set_state(&self, next: OrchestratorState) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            *state = next;
        }
        tracing::debug!(state = %next, "orchestrator state");
        if let Some(observer) = &self.observer {
            observer(next);
        }
    }
}

/// Path and query of `url`, as requested from each mirror.
fn mirror_path(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}
