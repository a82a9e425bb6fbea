//! Domain allow-list check for download URLs.
//!
//! This is a user-experience gate: it keeps the download form from being
//! pointed at arbitrary hosts by mistake. It does not authenticate anything
//! and does not restrict what the process can reach on the network.

mod rule;

pub use rule::DomainRule;

/// Result of checking a URL against the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Checks `url` against `rules`. An empty rule set allows nothing.
pub fn validate(url: &str, rules: &[DomainRule]) -> Verdict {
    let parsed = match url::Url::parse(url.trim()) {
        Ok(u) => u,
        Err(_) => return Verdict::Rejected("invalid url".to_string()),
    };
    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return Verdict::Rejected("invalid url".to_string()),
    };

    let mut host_matched = false;
    for rule in rules {
        if !rule.matches_host(host) {
            continue;
        }
        host_matched = true;
        if rule.matches_path(parsed.path()) {
            return Verdict::Allowed;
        }
    }

    if host_matched {
        Verdict::Rejected(format!("path {} is not allowed on host {}", parsed.path(), host))
    } else {
        Verdict::Rejected(format!("host {} is not in the allow-list", host))
    }
}
