use serde::{Deserialize, Serialize};

/// A host serving the same content under `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorCandidate {
    pub label: String,
    pub base_url: String,
}

impl MirrorCandidate {
    pub fn new(label: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base_url: base_url.into(),
        }
    }

    /// URL of `path` on this mirror.
    pub fn resolve(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// Joins a base URL and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return format!("{}/", base);
    }
    format!("{}/{}", base, path)
}
