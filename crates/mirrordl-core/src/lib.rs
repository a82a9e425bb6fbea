//! Mirror-selecting downloader with throttled progress reporting.
//!
//! A [`DownloadRequest`] goes through the domain allow-list, optionally
//! through mirror probing, then one streamed transfer whose body is handed
//! to an [`ArtifactSink`]. [`DownloadOrchestrator`] ties the steps together.

pub mod cancel;
pub mod checksum;
pub mod clock;
pub mod config;
pub mod domain_policy;
pub mod downloader;
pub mod error;
pub mod filename;
pub mod format;
pub mod logging;
pub mod mirror;
pub mod orchestrator;
pub mod outcome;
pub mod progress;
pub mod request;
pub mod save;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use cancel::CancelToken;
pub use config::MirrordlConfig;
pub use orchestrator::{DownloadOrchestrator, OrchestratorState};
pub use outcome::{DownloadOutcome, OutcomeStatus};
pub use progress::ProgressSnapshot;
pub use request::DownloadRequest;
pub use save::{ArtifactSink, DirSink};
