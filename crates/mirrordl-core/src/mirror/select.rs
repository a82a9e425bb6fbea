//! Probe every mirror, then pick the fastest (or the fallback).

use std::time::Duration;

use crate::clock::Clock;
use crate::config::{ProbeConcurrency, ProbeConfig};
use crate::transport::Transport;

use super::{probe, MirrorCandidate, ProbeResult};

/// Chosen mirror plus every probe result, in candidate order.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub chosen: MirrorCandidate,
    pub resolved_url: String,
    pub results: Vec<ProbeResult>,
}

impl Selection {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    /// True when no probe succeeded and the fallback mirror was chosen.
    pub fn used_fallback(&self) -> bool {
        self.success_count() == 0
    }

    /// The winning probe, if the choice came from a probe.
    pub fn winner(&self) -> Option<&ProbeResult> {
        rank(&self.results).map(|i| &self.results[i])
    }
}

/// Index of the successful result with the highest throughput.
/// Exact ties go to the earlier index.
pub fn rank(results: &[ProbeResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, r) in results.iter().enumerate() {
        if !r.succeeded {
            continue;
        }
        match best {
            Some(b) if results[b].throughput_bytes_per_sec >= r.throughput_bytes_per_sec => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Probes all `candidates` for `path` and chooses one.
///
/// In parallel mode every probe runs on its own thread and all of them are
/// joined before ranking, so the call takes about as long as the slowest
/// probe (each bounded by `cfg.timeout_ms`). Sequential mode takes the sum.
pub fn select(
    transport: &dyn Transport,
    clock: &dyn Clock,
    candidates: &[MirrorCandidate],
    path: &str,
    fallback: &MirrorCandidate,
    cfg: &ProbeConfig,
) -> Selection {
    let timeout = Duration::from_millis(cfg.timeout_ms);
    let run = |c: &MirrorCandidate| probe(transport, clock, c, path, cfg.test_bytes, timeout);

    let results: Vec<ProbeResult> = match cfg.concurrency {
        ProbeConcurrency::Sequential => candidates.iter().map(run).collect(),
        ProbeConcurrency::Parallel => std::thread::scope(|s| {
            let handles: Vec<_> = candidates
                .iter()
                .map(|c| s.spawn(move || run(c)))
                .collect();
            handles
                .into_iter()
                .zip(candidates)
                .map(|(h, c)| {
                    h.join().unwrap_or_else(|_| {
                        ProbeResult::failed(c, c.resolve(path), 0.0, "probe thread panicked")
                    })
                })
                .collect()
        }),
    };

    let selection = match rank(&results) {
        Some(i) => Selection {
            chosen: results[i].candidate.clone(),
            resolved_url: results[i].resolved_url.clone(),
            results,
        },
        None => Selection {
            chosen: fallback.clone(),
            resolved_url: fallback.resolve(path),
            results,
        },
    };

    if selection.used_fallback() {
        tracing::warn!(
            mirror = %selection.chosen.label,
            probed = selection.results.len(),
            "no mirror answered the probe; using fallback"
        );
    } else {
        tracing::info!(
            mirror = %selection.chosen.label,
            url = %selection.resolved_url,
            successes = selection.success_count(),
            probed = selection.results.len(),
            "selected fastest mirror"
        );
    }
    selection
}
