//! # MIME type helpers

use std::path::Path;

use tracing::debug;

/// The MIME type used when nothing better is known.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// The subtype used when a MIME type has none.
pub const DEFAULT_SUBTYPE: &str = "octet-stream";

/// Guess the MIME type of the given filename from its extension.
///
/// Falls back to [`DEFAULT_MIME_TYPE`] when the extension is missing
/// or unknown.
pub fn guess(filename: impl AsRef<Path>) -> String {
    let filename = filename.as_ref();
    let mime_type = mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE);
    debug!("no MIME type given, guessing from filename {filename:?}: {mime_type}");
    mime_type.to_owned()
}

/// Split the given MIME type into its main type and subtype.
pub fn split(mime_type: &str) -> (&str, &str) {
    match mime_type.trim().split_once('/') {
        Some((main, sub)) if !sub.trim().is_empty() => (main.trim(), sub.trim()),
        Some((main, _)) => (main.trim(), DEFAULT_SUBTYPE),
        None => (mime_type.trim(), DEFAULT_SUBTYPE),
    }
}
