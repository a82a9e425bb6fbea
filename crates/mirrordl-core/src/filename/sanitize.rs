//! Linux-safe filename sanitization.

/// Longest single path component Linux accepts, in bytes.
const NAME_MAX: usize = 255;

fn needs_replacing(c: char) -> bool {
    matches!(c, '/' | '\\') || c.is_control() || c.is_whitespace()
}

/// Makes `name` usable as a single Linux path component.
///
/// Separators, control characters and whitespace map to `_` and runs of `_`
/// fold into one. Dots and underscores are stripped from both ends, then the
/// name is cut to [`NAME_MAX`] bytes without splitting a character.
/// May return an empty string; callers pick their own fallback.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let collapsed = name
        .chars()
        .map(|c| if needs_replacing(c) { '_' } else { c })
        .fold(String::with_capacity(name.len()), |mut acc, c| {
            if !(c == '_' && acc.ends_with('_')) {
                acc.push(c);
            }
            acc
        });
    let trimmed = collapsed.trim_matches(|c| c == '.' || c == '_');
    let cut = trimmed
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= NAME_MAX)
        .last()
        .unwrap_or(0);
    trimmed[..cut].to_string()
}
