//! Cover artifact naming and reconciliation.
//!
//! A cover artifact is a square JPEG in the covers directory, named
//! `<unix-millis>_<sanitized-file-path>.jpg`. The sanitized token doubles
//! as the idempotency key: a reconciliation pass first looks for any
//! existing artifact whose name contains the token before producing a new
//! one.

mod compose;
mod resolver;

pub use compose::{gradient_cover, resize_letterbox, truncate_label};
pub use resolver::{CoverResolver, ReconcileSummary};

use std::path::Path;

use chrono::Utc;

/// Reduce a track's file path to an alphanumeric/dot/hyphen token.
///
/// Everything else becomes an underscore, matching artifact names written
/// by earlier runs so the substring check keeps finding them.
pub fn sanitize_file_path(file_path: &str) -> String {
    file_path
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Fresh deterministic artifact name for a sanitized token.
pub fn cover_file_name(token: &str) -> String {
    format!("{}_{}.jpg", Utc::now().timestamp_millis(), token)
}

/// Search the covers directory for an artifact containing `token`.
///
/// Returns the first matching file name. The substring match can false-
/// positive when one sanitized path is a substring of another; see the
/// note in DESIGN.md.
pub fn find_existing_cover(covers_dir: &Path, token: &str) -> std::io::Result<Option<String>> {
    if !covers_dir.is_dir() {
        return Ok(None);
    }

    for entry in std::fs::read_dir(covers_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.contains(token) {
            return Ok(Some(name));
        }
    }

    Ok(None)
}
