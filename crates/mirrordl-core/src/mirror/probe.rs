//! One bounded throughput probe against one mirror.

use std::time::Duration;

use crate::clock::Clock;
use crate::error::ErrorKind;
use crate::transport::{BodySink, ByteRange, Flow, GetRequest, ResponseHead, Transport, TransportError};

use super::MirrorCandidate;

/// Outcome of probing one mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub candidate: MirrorCandidate,
    pub resolved_url: String,
    pub throughput_bytes_per_sec: f64,
    pub duration_ms: f64,
    pub bytes_received: u64,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
    /// `ProbeFailure` for a failed probe. Never propagated past selection.
    pub error_kind: Option<ErrorKind>,
}

impl ProbeResult {
    pub(crate) fn failed(
        candidate: &MirrorCandidate,
        resolved_url: String,
        duration_ms: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            candidate: candidate.clone(),
            resolved_url,
            throughput_bytes_per_sec: 0.0,
            duration_ms,
            bytes_received: 0,
            succeeded: false,
            failure_reason: Some(reason.into()),
            error_kind: Some(ErrorKind::ProbeFailure),
        }
    }
}

/// Counts bytes and stops once enough have arrived, so a server that
/// ignores `Range` cannot turn a probe into a full download.
struct ProbeSink {
    limit: u64,
    received: u64,
}

impl BodySink for ProbeSink {
    fn head(&mut self, _head: &ResponseHead) -> Flow {
        Flow::Continue
    }

    fn chunk(&mut self, data: &[u8]) -> Flow {
        self.received += data.len() as u64;
        if self.received >= self.limit {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

/// Reads up to `test_bytes` of `path` from `candidate` and measures throughput.
///
/// Always returns a result; failures are recorded, never raised. Duration
/// covers the whole exchange up to the last body byte, and throughput uses
/// the bytes actually received rather than the size requested.
pub fn probe(
    transport: &dyn Transport,
    clock: &dyn Clock,
    candidate: &MirrorCandidate,
    path: &str,
    test_bytes: u64,
    timeout: Duration,
) -> ProbeResult {
    let resolved_url = candidate.resolve(path);
    let test_bytes = test_bytes.max(1);
    let request = GetRequest::new(&resolved_url)
        .range(ByteRange::first(test_bytes))
        .timeout(timeout);
    let mut sink = ProbeSink {
        limit: test_bytes,
        received: 0,
    };

    let start = clock.now();
    let result = transport.get(&request, &mut sink);
    let duration = clock.now().saturating_duration_since(start);
    let duration_ms = duration.as_secs_f64() * 1000.0;

    let outcome = match result {
        Ok(_) => Ok(()),
        Err(TransportError::Stopped) if sink.received >= sink.limit => Ok(()),
        Err(e) => Err(e.to_string()),
    };

    let result = match outcome {
        Ok(()) if sink.received == 0 => {
            ProbeResult::failed(candidate, resolved_url, duration_ms, "empty response")
        }
        Ok(()) => {
            let secs = duration.as_secs_f64();
            let throughput = if secs > 0.0 {
                sink.received as f64 / secs
            } else {
                0.0
            };
            ProbeResult {
                candidate: candidate.clone(),
                resolved_url,
                throughput_bytes_per_sec: throughput,
                duration_ms,
                bytes_received: sink.received,
                succeeded: true,
                failure_reason: None,
                error_kind: None,
            }
        }
        Err(reason) => {
            let mut r = ProbeResult::failed(candidate, resolved_url, duration_ms, reason);
            r.bytes_received = sink.received;
            r
        }
    };

    tracing::debug!(
        mirror = %candidate.label,
        url = %result.resolved_url,
        bytes = result.bytes_received,
        duration_ms = result.duration_ms,
        throughput = result.throughput_bytes_per_sec,
        failure = result.failure_reason.as_deref().unwrap_or(""),
        "mirror probe finished"
    );
    result
}
