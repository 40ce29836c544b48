//! Image upload validation and persistence.
//!
//! ```no_run
//! use palisade_core::UploadRecord;
//! use palisade_upload::ImageUploader;
//!
//! # fn main() -> Result<(), palisade_core::UploadError> {
//! let record = UploadRecord::new("cat.png", "/tmp/php1A2b3C", 48_213);
//! let mut uploader = ImageUploader::new([("image", record)]);
//! uploader.set_storage_directory("media/avatars", 0o755);
//!
//! let image = uploader.select("image")?.upload()?;
//! println!("stored at {}", image.path.display());
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod dimensions;
pub mod signature;
pub mod uploader;
pub mod validator;

pub use descriptor::{UploadDescriptor, UploadState};
pub use signature::{sniff, sniff_file};
pub use uploader::{ImageUploader, SelectedUpload};
pub use validator::ImageValidator;

pub use palisade_core::{
    ErrorKind, ImageType, UploadError, UploadPolicy, UploadRecord, UploadResult, UploadedImage,
};
