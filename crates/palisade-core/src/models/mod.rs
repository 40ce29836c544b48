//! Domain models

pub mod image;
pub mod record;

pub use image::{ImageType, UploadedImage};
pub use record::{TransportStatus, UploadRecord};
