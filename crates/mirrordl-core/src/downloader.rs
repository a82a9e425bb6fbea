//! The real transfer: one streamed GET, buffered in memory, with throttled
//! progress reporting.
//!
//! Nothing touches disk until the stream has ended; the assembled body is
//! then handed to the caller's [`ArtifactSink`] in one piece. Memory use is
//! therefore bounded by the size of the file.

use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::error::DownloadError;
use crate::outcome::DownloadOutcome;
use crate::progress::{ProgressMeter, ProgressSnapshot};
use crate::save::ArtifactSink;
use crate::transport::{BodySink, Flow, GetRequest, ResponseHead, Transport};

/// Reserve at most this much up front, whatever Content-Length claims.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

pub struct ProgressiveDownloader<'a> {
    transport: &'a dyn Transport,
    clock: &'a dyn Clock,
    interval: Duration,
}

struct TransferSink<'s> {
    clock: &'s dyn Clock,
    interval: Duration,
    started: Instant,
    cancel: &'s CancelToken,
    on_progress: &'s mut dyn FnMut(&ProgressSnapshot),
    meter: Option<ProgressMeter>,
    body: Vec<u8>,
}

impl TransferSink<'_> {
    fn meter(&mut self) -> &mut ProgressMeter {
        let (started, interval) = (self.started, self.interval);
        self.meter
            .get_or_insert_with(|| ProgressMeter::new(started, None, interval))
    }

    fn received(&self) -> u64 {
        self.body.len() as u64
    }

    /// Checks the body against the announced length and emits the final snapshot.
    fn finish(mut self) -> Result<Vec<u8>, DownloadError> {
        let now = self.clock.now();
        let meter = self.meter();
        if let Some(expected) = meter.total() {
            if meter.bytes() < expected {
                return Err(DownloadError::PrematureEnd {
                    expected,
                    received: meter.bytes(),
                });
            }
        }
        let snapshot = meter.finish(now);
        (self.on_progress)(&snapshot);
        Ok(self.body)
    }
}

impl BodySink for TransferSink<'_> {
    fn head(&mut self, head: &ResponseHead) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Stop;
        }
        if let Some(len) = head.content_length {
            self.body.reserve(len.min(MAX_PREALLOC) as usize);
        }
        self.meter = Some(ProgressMeter::new(self.started, head.content_length, self.interval));
        Flow::Continue
    }

    fn chunk(&mut self, data: &[u8]) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Stop;
        }
        self.body.extend_from_slice(data);
        let now = self.clock.now();
        if let Some(snapshot) = self.meter().record(data.len() as u64, now) {
            (self.on_progress)(&snapshot);
        }
        Flow::Continue
    }
}

impl<'a> ProgressiveDownloader<'a> {
    /// `interval` is the minimum time between progress callbacks.
    pub fn new(transport: &'a dyn Transport, clock: &'a dyn Clock, interval: Duration) -> Self {
        Self {
            transport,
            clock,
            interval,
        }
    }

    /// Downloads `url` and, once the stream has ended, saves it as `filename`
    /// through `sink`.
    ///
    /// `on_progress` is called at most once per interval, plus once at the
    /// end. There is no overall time limit on the transfer. If `cancel` fires,
    /// the read loop stops, the partial body is dropped and nothing is saved.
    pub fn download(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(&ProgressSnapshot),
        cancel: &CancelToken,
        sink: &mut dyn ArtifactSink,
        filename: &str,
    ) -> DownloadOutcome {
        let started = self.clock.now();
        tracing::info!(url, filename, "transfer started");

        let result = self.transfer(url, started, on_progress, cancel);
        let elapsed_ms = self.clock.now().saturating_duration_since(started).as_secs_f64() * 1000.0;

        let (body, received) = match result {
            Ok(body) => {
                let n = body.len() as u64;
                (body, n)
            }
            Err((err, received)) => {
                tracing::warn!(url, received, error = %err, "transfer failed");
                return DownloadOutcome::failed(&err, received, elapsed_ms, url);
            }
        };

        if cancel.is_cancelled() {
            return DownloadOutcome::failed(&DownloadError::Cancelled, received, elapsed_ms, url);
        }

        match sink.save(filename, &body) {
            Ok(path) => {
                tracing::info!(
                    url,
                    bytes = received,
                    elapsed_ms,
                    path = %path.display(),
                    "transfer completed"
                );
                DownloadOutcome::succeeded(received, elapsed_ms, url, path)
            }
            Err(e) => {
                let err = DownloadError::Save(e);
                tracing::warn!(url, error = %err, "could not save artifact");
                DownloadOutcome::failed(&err, received, elapsed_ms, url)
            }
        }
    }

    fn transfer(
        &self,
        url: &str,
        started: Instant,
        on_progress: &mut dyn FnMut(&ProgressSnapshot),
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, (DownloadError, u64)> {
        let request = GetRequest::new(url).cancel(cancel);
        let mut sink = TransferSink {
            clock: self.clock,
            interval: self.interval,
            started,
            cancel,
            on_progress,
            meter: None,
            body: Vec::new(),
        };

        let result = self.transport.get(&request, &mut sink);
        let received = sink.received();
        if cancel.is_cancelled() {
            return Err((DownloadError::Cancelled, received));
        }
        match result {
            Ok(_) => sink.finish().map_err(|e| (e, received)),
            Err(e) => Err((e.into(), received)),
        }
    }
}
