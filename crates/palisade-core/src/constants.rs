//! Default upload limits.

/// Image types accepted when the caller does not configure an allow-list.
///
/// `jpg` never comes out of signature sniffing (JPEG data is always reported as
/// `jpeg`) but is kept so allow-lists written with file extensions in mind
/// still read naturally in error messages.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &["jpeg", "png", "gif", "jpg"];

pub const DEFAULT_MIN_SIZE_BYTES: u64 = 100;
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5_000_000;

pub const DEFAULT_MAX_WIDTH: u32 = 5000;
pub const DEFAULT_MAX_HEIGHT: u32 = 5000;

pub const DEFAULT_STORAGE_DIR: &str = "uploads";
pub const DEFAULT_STORAGE_MODE: u32 = 0o666;
