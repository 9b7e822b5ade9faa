//! Naming rules for uploaded document files.
//!
//! Stored names never reuse the uploader's file name: only a sanitized
//! extension survives, so names cannot collide or escape the client directory.

use std::path::Path;

use rand::Rng;

use crate::types::{DbId, Timestamp};

/// MIME type recorded when the upload did not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Longest extension kept from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 16;

/// Lower-cased alphanumeric extension of `original`, if any.
pub fn sanitized_extension(original: &str) -> Option<String> {
    let ext = Path::new(original).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `<unix millis>-<suffix>[.ext]`.
pub fn stored_file_name(now: Timestamp, suffix: u32, original: &str) -> String {
    let stem = format!("{}-{suffix:08x}", now.timestamp_millis());
    match sanitized_extension(original) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Same as [`stored_file_name`] with a random suffix.
pub fn random_stored_file_name(now: Timestamp, original: &str) -> String {
    let suffix: u32 = rand::rng().random();
    stored_file_name(now, suffix, original)
}

/// Path of a stored file relative to the upload root.
pub fn client_relative_path(client_id: DbId, stored_name: &str) -> String {
    format!("{client_id}/{stored_name}")
}

/// `Content-Disposition` value that downloads under `name`.
pub fn attachment_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
