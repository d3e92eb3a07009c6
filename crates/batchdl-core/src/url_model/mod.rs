//! URL modeling and filename derivation.
//!
//! The destination name is the last path segment of the URL, sanitized for
//! Linux. URLs without a usable trailing segment get a random name.

mod path;
mod sanitize;

pub use path::last_path_segment;
pub use sanitize::sanitize_filename_for_linux;

/// Derives the local filename for `url`.
///
/// Uses the segment after the final `/` of the URL path. When the URL does
/// not parse, the path is empty or ends in `/`, or the segment sanitizes to
/// nothing usable, returns `<uuid>.<fallback_ext>`.
///
/// # Examples
///
/// - `derive_filename("https://host/a/song1.mp3", "bin")` → `"song1.mp3"`
/// - `derive_filename("https://host/a/", "bin")` → e.g. `"6f1c…e2.bin"`
pub fn derive_filename(url: &str, fallback_ext: &str) -> String {
    last_path_segment(url)
        .map(|s| sanitize_filename_for_linux(&s))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| random_filename(fallback_ext))
}

/// Random unique filename with the given extension (leading dots ignored).
pub fn random_filename(ext: &str) -> String {
    let token = uuid::Uuid::new_v4().simple();
    match ext.trim_start_matches('.') {
        "" => token.to_string(),
        ext => format!("{token}.{ext}"),
    }
}
