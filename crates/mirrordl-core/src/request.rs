//! What the user asked to download.

/// A download request. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub suggested_filename: Option<String>,
}

impl DownloadRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            suggested_filename: None,
        }
    }

    /// Blank names are treated as absent.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.suggested_filename = if name.trim().is_empty() { None } else { Some(name) };
        self
    }

    /// Builds a request from a query string carrying `url` and optionally
    /// `name` (e.g. `?url=https%3A%2F%2Fhost%2Ff.bin&name=f.bin`), with values
    /// percent-decoded. Returns `None` when there is no non-empty `url`.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.trim().trim_start_matches('?');
        let mut url = None;
        let mut name = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" if url.is_none() => url = Some(value.into_owned()),
                "name" if name.is_none() => name = Some(value.into_owned()),
                _ => {}
            }
        }
        let url = url.filter(|u| !u.trim().is_empty())?;
        let mut request = Self::new(url.trim());
        if let Some(name) = name {
            request = request.with_filename(name);
        }
        Some(request)
    }
}
