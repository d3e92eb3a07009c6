//! Filename extraction from URL path.

/// Returns the segment after the final `/` of the URL path.
///
/// Returns `None` if the URL cannot be parsed, or the path is empty or ends
/// in `/`. Query and fragment are not part of the path and are ignored.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}
