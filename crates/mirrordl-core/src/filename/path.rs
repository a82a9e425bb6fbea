/// Last non-empty path segment of `url`, ignoring query and fragment.
///
/// `None` for unparseable URLs and root paths.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed
        .path_segments()?
        .rev()
        .find(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(str::to_string)
}
