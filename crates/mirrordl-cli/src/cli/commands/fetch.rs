//! `mirrordl fetch`: one download, with progress and Ctrl-C cancellation.

use anyhow::{bail, Context, Result};
use mirrordl_core::checksum;
use mirrordl_core::config::{MirrordlConfig, ProbeConcurrency};
use mirrordl_core::format;
use mirrordl_core::{
    CancelToken, DirSink, DownloadOrchestrator, DownloadOutcome, DownloadRequest,
    OrchestratorState, ProgressSnapshot,
};
use std::path::PathBuf;

use super::probe::print_selection;

/// Everything `fetch` was asked to do, after flag parsing.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub url: Option<String>,
    pub name: Option<String>,
    pub from_query: Option<String>,
    pub start: bool,
    pub output_dir: Option<PathBuf>,
    /// Overrides `mirror_selection_enabled` when set.
    pub mirrors: Option<bool>,
    pub sequential: bool,
    pub overwrite: bool,
    pub sha256: bool,
    pub expect_sha256: Option<String>,
}

/// What to do with the parsed request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Plan {
    Start(DownloadRequest),
    /// Prefilled from a query but not started.
    Prefilled(DownloadRequest),
}

pub(crate) fn plan(opts: &FetchOptions, cfg: &MirrordlConfig) -> Result<Plan> {
    if let Some(query) = &opts.from_query {
        let mut request = DownloadRequest::from_query(query)
            .context("query has no `url` parameter")?;
        if let Some(name) = &opts.name {
            request = request.with_filename(name.clone());
        }
        return Ok(if cfg.auto_start_from_query || opts.start {
            Plan::Start(request)
        } else {
            Plan::Prefilled(request)
        });
    }
    let url = opts.url.clone().unwrap_or_default();
    let mut request = DownloadRequest::new(url);
    if let Some(name) = &opts.name {
        request = request.with_filename(name.clone());
    }
    Ok(Plan::Start(request))
}

pub(crate) fn apply_overrides(cfg: &mut MirrordlConfig, opts: &FetchOptions) -> Result<()> {
    if let Some(enabled) = opts.mirrors {
        cfg.mirror_selection_enabled = enabled;
    }
    if opts.sequential {
        cfg.probe.concurrency = ProbeConcurrency::Sequential;
    }
    cfg.validate()
}

fn print_progress(s: &ProgressSnapshot) {
    let d = s.display();
    let eta = s
        .eta_secs()
        .map(|secs| format!("{:.0}s", secs))
        .unwrap_or_else(|| "?".to_string());
    println!(
        "  {:>4}  {:>10}  {:>11}  {:>6}  ETA {}",
        d.percent, d.size, d.speed, d.elapsed, eta
    );
}

fn announce(state: OrchestratorState) {
    match state {
        OrchestratorState::Probing => println!("Probing mirrors..."),
        OrchestratorState::Downloading => println!("Downloading..."),
        _ => tracing::debug!(%state, "fetch state"),
    }
}

pub async fn run_fetch(mut cfg: MirrordlConfig, opts: FetchOptions) -> Result<()> {
    let request = match plan(&opts, &cfg)? {
        Plan::Start(r) => r,
        Plan::Prefilled(r) => {
            println!("Prefilled: {}", r.source_url);
            if let Some(name) = &r.suggested_filename {
                println!("Save as:   {}", name);
            }
            println!("auto_start_from_query is off; pass --start to download.");
            return Ok(());
        }
    };
    apply_overrides(&mut cfg, &opts)?;

    let output_dir = match &opts.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let cancel = CancelToken::new();
    let ctrl_c = tokio::spawn({
        let token = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("Cancelling...");
                token.cancel();
            }
        }
    });

    let overwrite = opts.overwrite;
    let outcome: DownloadOutcome = tokio::task::spawn_blocking(move || {
        let orchestrator = DownloadOrchestrator::with_curl(cfg).observe(announce);
        let mut sink = DirSink::new(output_dir).overwrite(overwrite);
        orchestrator.submit(&request, &mut print_progress, &cancel, &mut sink)
    })
    .await
    .context("download task join")?;
    ctrl_c.abort();

    if let Some(selection) = &outcome.selection {
        print_selection(selection);
    }
    if !outcome.is_success() {
        bail!("{}", outcome.status_line());
    }

    println!("{}", outcome.status_line());
    let saved = outcome
        .saved_as
        .as_deref()
        .context("successful download has no saved path")?;
    println!(
        "Saved {} to {} in {}",
        format::format_bytes(outcome.bytes_transferred),
        saved.display(),
        format::format_elapsed(outcome.elapsed_ms)
    );

    if opts.sha256 || opts.expect_sha256.is_some() {
        let digest = checksum_saved(saved.to_path_buf(), opts.expect_sha256.clone()).await?;
        println!("{}  {}", digest, saved.display());
        if opts.expect_sha256.is_some() {
            println!("Checksum OK");
        }
    }
    Ok(())
}

/// Hashes the saved file on the blocking pool, verifying it when `expected` is set.
async fn checksum_saved(path: PathBuf, expected: Option<String>) -> Result<String> {
    tokio::task::spawn_blocking(move || match expected {
        Some(expected) => checksum::verify_sha256(&path, &expected),
        None => checksum::sha256_path(&path),
    })
    .await
    .context("checksum task join")?
}
