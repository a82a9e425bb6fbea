//! `mirrordl probe <path>`: mirror selection on its own.

use anyhow::{bail, Context, Result};
use mirrordl_core::config::{MirrordlConfig, ProbeConcurrency};
use mirrordl_core::format;
use mirrordl_core::mirror::{ProbeResult, Selection};
use mirrordl_core::DownloadOrchestrator;

pub(crate) fn print_probe_results(results: &[ProbeResult]) {
    println!(
        "  {:<12}  {:>10}  {:>9}  {:>12}  {}",
        "Mirror", "Bytes", "Time(ms)", "Speed", "Result"
    );
    println!(
        "  {}  {}  {}  {}  {}",
        "------------", "----------", "---------", "------------", "------"
    );
    for r in results {
        let result = if r.succeeded {
            "ok"
        } else {
            r.failure_reason.as_deref().unwrap_or("failed")
        };
        println!(
            "  {:<12}  {:>10}  {:>9.0}  {:>12}  {}",
            r.candidate.label,
            format::format_bytes(r.bytes_received),
            r.duration_ms,
            format::format_speed(r.throughput_bytes_per_sec),
            result
        );
    }
}

pub(crate) fn print_selection(selection: &Selection) {
    print_probe_results(&selection.results);
    if selection.used_fallback() {
        println!(
            "No mirror answered; fallback used: {} ({})",
            selection.chosen.label, selection.resolved_url
        );
    } else {
        println!(
            "Fastest mirror: {} ({})",
            selection.chosen.label, selection.resolved_url
        );
    }
}

pub async fn run_probe(mut cfg: MirrordlConfig, path: &str, sequential: bool) -> Result<()> {
    if cfg.mirrors.is_empty() {
        bail!("no mirrors configured; add [[mirrors]] entries to the config file");
    }
    if sequential {
        cfg.probe.concurrency = ProbeConcurrency::Sequential;
    }
    let path = path.to_string();
    let selection = tokio::task::spawn_blocking(move || {
        DownloadOrchestrator::with_curl(cfg).select_mirror(&path)
    })
    .await
    .context("probe task join")?
    .context("no mirror or fallback to probe")?;
    print_selection(&selection);
    Ok(())
}
