use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that may not appear in a stored object-key segment.
    /// Anything outside [A-Za-z0-9._-] is replaced before a filename is
    /// embedded in a staged or permanent key.
    pub static ref FILENAME_UNSAFE_REGEX: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Reduce a client-supplied filename to a safe object-key segment.
///
/// Path components are stripped (only the final segment survives), unsafe
/// characters are replaced with underscores, and leading/trailing dots are
/// removed so the segment can never be "." or "..".
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();

    let cleaned = FILENAME_UNSAFE_REGEX.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lowercased extension of a filename, if it has one
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
