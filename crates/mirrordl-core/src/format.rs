//! Human-readable strings for byte counts, transfer rates and elapsed time.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const MIB: f64 = 1_048_576.0;

/// Formats a byte count with 1024-based units, rounded to two decimals
/// with trailing zeros dropped (`1536` → `"1.5 KB"`, `0` → `"0 Bytes"`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Formats a rate as `"X.Y MB/s"` (MiB-based, one decimal).
pub fn format_speed(bytes_per_sec: f64) -> String {
    let rate = if bytes_per_sec.is_finite() && bytes_per_sec > 0.0 {
        bytes_per_sec / MIB
    } else {
        0.0
    };
    format!("{:.1} MB/s", rate)
}

/// Formats elapsed milliseconds as whole seconds (`"12s"`).
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let secs = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
        (elapsed_ms / 1000.0).round() as u64
    } else {
        0
    };
    format!("{}s", secs)
}

/// Formats a completion percentage (`"42%"`), or `"?"` when the total is unknown.
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:.0}%", p.clamp(0.0, 100.0).floor()),
        None => "?".to_string(),
    }
}

fn trim_decimals(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
