//! Response status and headers, parsed from raw header lines.

/// Status and the headers the downloader cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u32,
    /// `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Accumulates header lines across redirects and interim responses.
///
/// libcurl calls the header callback once per line for every response it
/// sees, including `100 Continue` and followed redirects. Each status line
/// starts a new block; the block that ends last before the body is the one
/// that matters.
#[derive(Debug, Default)]
pub(crate) struct HeaderBlock {
    current: Option<ResponseHead>,
    complete: Option<ResponseHead>,
}

impl HeaderBlock {
    pub(crate) fn push_line(&mut self, raw: &[u8]) {
        let line = match std::str::from_utf8(raw) {
            Ok(s) => s.trim(),
            Err(_) => return,
        };
        if line.starts_with("HTTP/") {
            let status = line
                .split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0);
            self.current = Some(ResponseHead {
                status,
                content_length: None,
            });
            return;
        }
        if line.is_empty() {
            if let Some(head) = self.current.take() {
                self.complete = Some(head);
            }
            return;
        }
        if let (Some(head), Some((name, value))) = (self.current.as_mut(), line.split_once(':')) {
            if name.trim().eq_ignore_ascii_case("content-length") {
                head.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    /// Head of the final response, once its header block has ended.
    pub(crate) fn final_head(&self) -> Option<ResponseHead> {
        self.complete
    }
}
