//! MIME type resolution for downloaded media.

use std::path::Path;

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Declared MIME type if present, else guessed from the file extension, else
/// `application/octet-stream`.
pub fn resolve_mime_type(declared: Option<&str>, path: &Path) -> String {
    declared
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(path).first().map(|m| m.essence_str().to_string()))
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}
