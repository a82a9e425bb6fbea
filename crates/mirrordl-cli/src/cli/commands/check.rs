//! `mirrordl check <url>`: run the domain allow-list only.

use anyhow::{bail, Result};
use mirrordl_core::config::MirrordlConfig;
use mirrordl_core::domain_policy::{self, Verdict};

pub fn run_check(cfg: &MirrordlConfig, url: &str) -> Result<()> {
    match domain_policy::validate(url, &cfg.allowed_domains) {
        Verdict::Allowed => {
            println!("allowed: {}", url);
            Ok(())
        }
        Verdict::Rejected(reason) => bail!("rejected: {}", reason),
    }
}
