//! Deterministic object-key construction for uploaded files.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Fallback for names that sanitize to nothing.
const UNNAMED: &str = "unnamed";

/// Replace path separators and control characters, then trim.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        UNNAMED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lowercased extension of a file name including the dot, or empty.
fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

/// Generate `{unix_millis}_{8 hex}{.ext}` for an original file name.
pub fn stored_filename(original: &str, now: DateTime<Utc>) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}{}",
        now.timestamp_millis(),
        &nonce[..8],
        extension_of(original)
    )
}

/// Object key of an original: `{storage_path}/{stored_filename}`.
pub fn file_path(storage_path: &str, stored_filename: &str) -> String {
    format!("{storage_path}/{stored_filename}")
}

/// Object key of a thumbnail in the thumbnails bucket.
pub fn thumbnail_path(owner_id: Uuid, folder_index: i64, stored_filename: &str) -> String {
    let stem = stored_filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(stored_filename);
    format!("{owner_id}/thumbnails/folder_{folder_index:03}/thumb_{stem}.jpg")
}
