use serde::{Deserialize, Serialize};

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRule {
    pub host: String,
    /// Also accept any `*.host`.
    #[serde(default)]
    pub match_subdomains: bool,
    /// When set, the URL path must contain this substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_path_substring: Option<String>,
}

impl DomainRule {
    pub fn exact(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            match_subdomains: false,
            required_path_substring: None,
        }
    }

    pub fn with_subdomains(host: impl Into<String>) -> Self {
        Self {
            match_subdomains: true,
            ..Self::exact(host)
        }
    }

    pub fn require_path(mut self, substring: impl Into<String>) -> Self {
        self.required_path_substring = Some(substring.into());
        self
    }

    /// `hostname` must already be lowercase (as produced by URL parsing).
    pub(crate) fn matches_host(&self, hostname: &str) -> bool {
        let host = self.host.to_ascii_lowercase();
        if hostname == host {
            return true;
        }
        self.match_subdomains
            && hostname.len() > host.len()
            && hostname.ends_with(&host)
            && hostname.as_bytes()[hostname.len() - host.len() - 1] == b'.'
    }

    pub(crate) fn matches_path(&self, path: &str) -> bool {
        match &self.required_path_substring {
            Some(needle) => path.contains(needle.as_str()),
            None => true,
        }
    }
}
