//! Progress snapshots for a running transfer and the meter that paces them.
//!
//! The meter sees every chunk but only lets a snapshot out once per
//! interval, plus one final snapshot when the stream ends. Speed is measured
//! over the window since the previous emitted snapshot, so it tracks recent
//! throughput rather than the whole-transfer average.

use std::time::{Duration, Instant};

use crate::format;

/// Point-in-time view of one transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub bytes_transferred: u64,
    /// Size announced by the server, if any.
    pub total_bytes: Option<u64>,
    /// 0–100; present only when `total_bytes` is known and non-zero.
    pub percent: Option<f64>,
    pub instantaneous_speed_bps: f64,
    pub elapsed_ms: f64,
}

/// The four strings a progress display shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDisplay {
    pub percent: String,
    pub size: String,
    pub speed: String,
    pub elapsed: String,
}

impl ProgressSnapshot {
    /// Estimated seconds remaining at the current speed (None if the total is
    /// unknown or nothing is moving).
    pub fn eta_secs(&self) -> Option<f64> {
        let total = self.total_bytes?;
        let remaining = total.saturating_sub(self.bytes_transferred);
        if remaining == 0 {
            return Some(0.0);
        }
        if self.instantaneous_speed_bps <= 0.0 {
            return None;
        }
        Some(remaining as f64 / self.instantaneous_speed_bps)
    }

    pub fn display(&self) -> ProgressDisplay {
        ProgressDisplay {
            percent: format::format_percent(self.percent),
            size: format::format_bytes(self.bytes_transferred),
            speed: format::format_speed(self.instantaneous_speed_bps),
            elapsed: format::format_elapsed(self.elapsed_ms),
        }
    }
}

/// Accumulates bytes and decides when a snapshot is due.
#[derive(Debug)]
pub struct ProgressMeter {
    interval: Duration,
    started: Instant,
    total: Option<u64>,
    bytes: u64,
    last_emit_at: Instant,
    last_emit_bytes: u64,
    last_speed: f64,
}

impl ProgressMeter {
    pub fn new(started: Instant, total: Option<u64>, interval: Duration) -> Self {
        Self {
            interval,
            started,
            total,
            bytes: 0,
            last_emit_at: started,
            last_emit_bytes: 0,
            last_speed: 0.0,
        }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Adds `n` received bytes; returns a snapshot if the interval has elapsed
    /// since the last one.
    pub fn record(&mut self, n: u64, now: Instant) -> Option<ProgressSnapshot> {
        self.bytes += n;
        if now.saturating_duration_since(self.last_emit_at) < self.interval {
            return None;
        }
        Some(self.emit(now))
    }

    /// Snapshot for the end of the stream; always emitted.
    pub fn finish(&mut self, now: Instant) -> ProgressSnapshot {
        self.emit(now)
    }

    fn emit(&mut self, now: Instant) -> ProgressSnapshot {
        let window = now.saturating_duration_since(self.last_emit_at).as_secs_f64();
        if window > 0.0 {
            self.last_speed = (self.bytes - self.last_emit_bytes) as f64 / window;
        }
        self.last_emit_at = now;
        self.last_emit_bytes = self.bytes;

        ProgressSnapshot {
            bytes_transferred: self.bytes,
            total_bytes: self.total,
            percent: self.percent(),
            instantaneous_speed_bps: self.last_speed,
            elapsed_ms: now.saturating_duration_since(self.started).as_secs_f64() * 1000.0,
        }
    }

    fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.bytes as f64 * 100.0 / total as f64).min(100.0))
            }
            _ => None,
        }
    }
}
