//! Error types module
//!
//! Every failure an upload can run into is a variant of [`UploadError`]. The
//! `Display` output of each variant is the human-readable message handed back
//! to the end user, so hosts can forward `err.to_string()` as-is.

use std::path::PathBuf;

use crate::models::TransportStatus;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Broad category of an [`UploadError`], for hosts that need to branch
/// without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The build cannot sniff or decode images
    Capability,
    /// The requested input key was never submitted
    Selection,
    /// The upload transport reported a failure
    Transport,
    /// Mime, size or dimension checks rejected the file
    Validation,
    /// The storage directory or the final move failed
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Image decoding support is unavailable: {0}")]
    CapabilityMissing(String),

    #[error("No file input found with name: ({0})")]
    NoSuchInput(String),

    #[error("{}", .0.message())]
    Transport(TransportStatus),

    #[error("Unknown upload error code ({0})")]
    UnknownTransportStatus(i32),

    #[error("Invalid File! Only ({}) image types are allowed", .allowed.join(", "))]
    InvalidMime { allowed: Vec<String> },

    #[error(
        "Image size should be minimum {min} bytes ({} kb), upto maximum {max} bytes ({} kb)",
        kilobytes(.min),
        kilobytes(.max)
    )]
    InvalidSize { min: u64, max: u64 },

    #[error("Image size could not be verified (declared {declared} bytes, found {actual} bytes)")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("Image height should be smaller than ({max_height}) pixels")]
    HeightExceeded { max_height: u32 },

    #[error("Image width should be smaller than ({max_width}) pixels")]
    WidthExceeded { max_width: u32 },

    #[error("Image dimensions could not be read")]
    UnreadableDimensions,

    #[error("Image file could not be read: {0}")]
    Unreadable(String),

    #[error("Can not create a directory '{}', please check write permission", .0.display())]
    StorageNotWritable(PathBuf),

    #[error("Error! directory '{}' could not be created", .0.display())]
    StorageCreateFailed(PathBuf),

    #[error("Image could not be saved to '{}': {reason}", .path.display())]
    PersistFailed { path: PathBuf, reason: String },
}

fn kilobytes(bytes: &u64) -> u64 {
    bytes / 1000
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::CapabilityMissing(_) => ErrorKind::Capability,
            UploadError::NoSuchInput(_) => ErrorKind::Selection,
            UploadError::Transport(_) | UploadError::UnknownTransportStatus(_) => {
                ErrorKind::Transport
            }
            UploadError::InvalidMime { .. }
            | UploadError::InvalidSize { .. }
            | UploadError::SizeMismatch { .. }
            | UploadError::HeightExceeded { .. }
            | UploadError::WidthExceeded { .. }
            | UploadError::UnreadableDimensions
            | UploadError::Unreadable(_) => ErrorKind::Validation,
            UploadError::StorageNotWritable(_)
            | UploadError::StorageCreateFailed(_)
            | UploadError::PersistFailed { .. } => ErrorKind::Storage,
        }
    }
}
