//! File name resolution for stored uploads.
//!
//! Names never carry an extension; the sniffed image type is appended by the
//! storage layer.

use rand::seq::SliceRandom;
use uuid::Uuid;

/// Longest name kept from a caller-supplied value, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Generate a collision-resistant name.
///
/// The first half is a UUIDv7, so names sort by creation time and two calls in
/// the same millisecond still differ in their random bits. The shuffled
/// `e..=q` suffix adds a little more entropy without any shared state.
pub fn generate_name() -> String {
    let mut suffix: Vec<char> = ('e'..='q').collect();
    suffix.shuffle(&mut rand::rng());

    format!(
        "{}_{}",
        Uuid::now_v7().simple(),
        suffix.into_iter().collect::<String>()
    )
}

/// Sanitize a caller-supplied name.
///
/// Only the last path component is kept, and every character outside
/// `[A-Za-z0-9_-]` becomes `_`. Returns `None` when nothing usable is left.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw);

    let sanitized: String = base
        .trim()
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().any(|c| c.is_ascii_alphanumeric()) {
        Some(sanitized)
    } else {
        None
    }
}

/// Use the sanitized explicit name when one is given and usable, otherwise
/// generate one.
pub fn resolve_name(explicit: Option<&str>) -> String {
    match explicit.and_then(sanitize_name) {
        Some(name) => name,
        None => {
            if let Some(raw) = explicit.filter(|s| !s.is_empty()) {
                tracing::debug!(
                    raw = %raw,
                    "Explicit name unusable after sanitizing, generating one"
                );
            }
            generate_name()
        }
    }
}
