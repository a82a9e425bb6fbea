//! Command-line surface of mirrordl.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mirrordl_core::config::{self, MirrordlConfig};
use std::path::{Path, PathBuf};

use commands::{run_check, run_checksum, run_fetch, run_probe, FetchOptions};

/// Top-level CLI for mirrordl.
#[derive(Debug, Parser)]
#[command(name = "mirrordl")]
#[command(about = "Download a file, optionally from the fastest of several mirrors", long_about = None)]
pub struct Cli {
    /// Read configuration from FILE instead of ~/.config/mirrordl/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file.
    Fetch {
        /// HTTP/HTTPS URL to download.
        #[arg(required_unless_present = "from_query", conflicts_with = "from_query")]
        url: Option<String>,

        /// Save under this name instead of the last segment of the URL.
        #[arg(long)]
        name: Option<String>,

        /// Take the request from a query string, e.g. "url=https%3A%2F%2F...&name=x.bin".
        #[arg(long, value_name = "QUERY")]
        from_query: Option<String>,

        /// Start a --from-query request even when auto_start_from_query is off.
        #[arg(long)]
        start: bool,

        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Probe the configured mirrors and download from the fastest.
        #[arg(long, conflicts_with = "no_mirrors")]
        mirrors: bool,

        /// Download the URL as given, even if mirror selection is enabled in the config.
        #[arg(long)]
        no_mirrors: bool,

        /// Probe mirrors one at a time.
        #[arg(long)]
        sequential: bool,

        /// Replace an existing file instead of picking a numbered name.
        #[arg(long)]
        overwrite: bool,

        /// Print the SHA-256 of the saved file.
        #[arg(long)]
        sha256: bool,

        /// Fail unless the saved file has this SHA-256 (hex).
        #[arg(long, value_name = "HEX")]
        expect_sha256: Option<String>,
    },

    /// Probe the configured mirrors for PATH and report the fastest.
    Probe {
        /// Path (and query) to request from each mirror, e.g. /roms/game.gba.
        path: String,

        /// Probe mirrors one at a time.
        #[arg(long)]
        sequential: bool,
    },

    /// Check a URL against the domain allow-list.
    Check {
        url: String,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<MirrordlConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                url,
                name,
                from_query,
                start,
                output_dir,
                mirrors,
                no_mirrors,
                sequential,
                overwrite,
                sha256,
                expect_sha256,
            } => {
                let opts = FetchOptions {
                    url,
                    name,
                    from_query,
                    start,
                    output_dir,
                    mirrors: match (mirrors, no_mirrors) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    },
                    sequential,
                    overwrite,
                    sha256,
                    expect_sha256,
                };
                run_fetch(cfg, opts).await?;
            }
            CliCommand::Probe { path, sequential } => run_probe(cfg, &path, sequential).await?,
            CliCommand::Check { url } => run_check(&cfg, &url)?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
