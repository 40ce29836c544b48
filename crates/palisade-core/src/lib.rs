//! Palisade Core Library
//!
//! This crate provides the domain models, error type and configuration shared
//! by the storage and upload crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::UploadPolicy;
pub use error::{ErrorKind, UploadError, UploadResult};
pub use models::{ImageType, TransportStatus, UploadRecord, UploadedImage};
