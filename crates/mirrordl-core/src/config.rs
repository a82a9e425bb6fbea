use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain_policy::DomainRule;
use crate::mirror::MirrorCandidate;

/// How mirror probes are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeConcurrency {
    /// All probes at once; selection waits for every one of them.
    #[default]
    Parallel,
    /// One probe at a time, in list order.
    Sequential,
}

/// Mirror probe parameters (`[probe]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Bytes requested from each mirror.
    pub test_bytes: u64,
    /// Per-probe wall-clock limit in milliseconds.
    pub timeout_ms: u64,
    pub concurrency: ProbeConcurrency,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            test_bytes: 2 * 1024 * 1024,
            timeout_ms: 5000,
            concurrency: ProbeConcurrency::Parallel,
        }
    }
}

/// Global configuration loaded from `~/.config/mirrordl/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrordlConfig {
    /// Probe mirrors and download from the fastest instead of the URL as given.
    pub mirror_selection_enabled: bool,
    /// Start downloading right away when a request arrives through query parameters.
    pub auto_start_from_query: bool,
    /// Minimum time between progress updates, in milliseconds.
    pub progress_interval_ms: u64,
    /// Connection setup limit in seconds. Does not bound the transfer itself.
    pub connect_timeout_secs: u64,
    pub probe: ProbeConfig,
    /// Used when no probe succeeds. Defaults to the first entry of `mirrors`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_mirror: Option<MirrorCandidate>,
    /// Hosts downloads may be requested from.
    pub allowed_domains: Vec<DomainRule>,
    pub mirrors: Vec<MirrorCandidate>,
}

impl Default for MirrordlConfig {
    fn default() -> Self {
        Self {
            mirror_selection_enabled: false,
            auto_start_from_query: true,
            progress_interval_ms: 500,
            connect_timeout_secs: 30,
            probe: ProbeConfig::default(),
            fallback_mirror: None,
            allowed_domains: vec![
                DomainRule::with_subdomains("qvznr.github.io"),
                DomainRule::with_subdomains("localhost"),
                DomainRule::with_subdomains("127.0.0.1"),
            ],
            mirrors: Vec::new(),
        }
    }
}

impl MirrordlConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Explicit fallback, else the first configured mirror.
    pub fn fallback(&self) -> Option<&MirrorCandidate> {
        self.fallback_mirror.as_ref().or_else(|| self.mirrors.first())
    }

    /// Rejects settings the downloader cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.mirror_selection_enabled && self.fallback().is_none() {
            anyhow::bail!("mirror selection is enabled but no mirrors are configured");
        }
        if self.probe.test_bytes == 0 {
            anyhow::bail!("probe.test_bytes must be greater than 0");
        }
        if self.probe.timeout_ms == 0 {
            anyhow::bail!("probe.timeout_ms must be greater than 0");
        }
        for m in self.mirrors.iter().chain(self.fallback_mirror.iter()) {
            url::Url::parse(&m.base_url)
                .with_context(|| format!("mirror {} has an invalid base_url: {}", m.label, m.base_url))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mirrordl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrordlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrordlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<MirrordlConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: MirrordlConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
