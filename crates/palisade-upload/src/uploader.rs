//! Upload lifecycle: select → validate → persist.
//!
//! [`ImageUploader`] owns the records handed over by the request layer and the
//! active [`UploadPolicy`]. Selecting a record yields a [`SelectedUpload`],
//! which runs the checks and finally moves the file into storage.
//!
//! Checks run in a fixed order (mime, size, dimensions) and the first failure
//! wins: it is stored on the descriptor, the upload becomes `Failed`, and every
//! later call returns that same error without touching the filesystem.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use palisade_core::{
    ImageType, UploadError, UploadPolicy, UploadRecord, UploadResult, UploadedImage,
};
use palisade_storage::{resolve_name, LocalStorage};

use crate::descriptor::{UploadDescriptor, UploadState};
use crate::dimensions::{check_capability, probe_dimensions};
use crate::signature::sniff_file;
use crate::validator::ImageValidator;

/// Entry point for validating and storing uploaded images.
#[derive(Debug)]
pub struct ImageUploader {
    records: HashMap<String, UploadRecord>,
    policy: UploadPolicy,
    capability_error: Option<UploadError>,
    last_error: Option<UploadError>,
}

impl ImageUploader {
    /// Create an uploader with the default policy.
    pub fn new<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, UploadRecord)>,
        K: Into<String>,
    {
        Self::with_policy(records, UploadPolicy::default())
    }

    pub fn with_policy<I, K>(records: I, policy: UploadPolicy) -> Self
    where
        I: IntoIterator<Item = (K, UploadRecord)>,
        K: Into<String>,
    {
        let capability_error = check_capability().err();
        if let Some(err) = &capability_error {
            tracing::error!(error = %err, "Image uploads are unavailable in this build");
        }

        Self {
            records: records
                .into_iter()
                .map(|(key, record)| (key.into(), record))
                .collect(),
            policy,
            last_error: capability_error.clone(),
            capability_error,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn set_allowed_mime_types<I, S>(&mut self, types: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.allowed_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_size_bounds(&mut self, min_bytes: u64, max_bytes: u64) -> &mut Self {
        self.policy.min_size_bytes = min_bytes;
        self.policy.max_size_bytes = max_bytes;
        self
    }

    pub fn set_dimension_bounds(&mut self, max_width: u32, max_height: u32) -> &mut Self {
        self.policy.max_width = max_width;
        self.policy.max_height = max_height;
        self
    }

    /// Directory is only checked and created when an upload is persisted.
    pub fn set_storage_directory(&mut self, dir: impl Into<PathBuf>, mode: u32) -> &mut Self {
        self.policy.storage_dir = dir.into();
        self.policy.storage_mode = mode;
        self
    }

    /// Pick the record submitted under `key`.
    ///
    /// Fails when the build lacks image decoders, when no record exists under
    /// `key`, or when the transport reported a failure for it.
    pub fn select(&mut self, key: &str) -> UploadResult<SelectedUpload<'_>> {
        match self.describe(key) {
            Ok(descriptor) => {
                tracing::debug!(key, name = %descriptor.raw_name(), "Upload selected");
                self.last_error = None;
                Ok(SelectedUpload {
                    uploader: self,
                    descriptor,
                })
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Upload selection failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn describe(&self, key: &str) -> UploadResult<UploadDescriptor> {
        if let Some(err) = &self.capability_error {
            return Err(err.clone());
        }

        let record = self
            .records
            .get(key)
            .ok_or_else(|| UploadError::NoSuchInput(key.to_string()))?;

        let status = record.status()?;
        if !status.is_ok() {
            return Err(UploadError::Transport(status));
        }

        Ok(UploadDescriptor::from_record(key, record))
    }

    /// Error from the most recent operation, if it failed.
    pub fn last_error(&self) -> Option<&UploadError> {
        self.last_error.as_ref()
    }

    /// Message of [`last_error`](Self::last_error), or an empty string.
    pub fn error_message(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Facts established by a full validation pass
struct CheckedImage {
    mime: ImageType,
    size: u64,
    width: u32,
    height: u32,
}

/// One upload picked out of an [`ImageUploader`].
#[derive(Debug)]
pub struct SelectedUpload<'a> {
    uploader: &'a mut ImageUploader,
    descriptor: UploadDescriptor,
}

impl SelectedUpload<'_> {
    pub fn descriptor(&self) -> &UploadDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> UploadState {
        self.descriptor.state
    }

    /// Store under `name` (sanitized) instead of a generated name. `None` or
    /// a name with nothing usable in it falls back to generation.
    pub fn set_name(&mut self, name: Option<&str>) -> &mut Self {
        self.descriptor.final_name = Some(resolve_name(name));
        self
    }

    /// Sniff the file's signature and check it against the allow-list.
    pub fn validate_mime(&mut self) -> UploadResult<ImageType> {
        self.ensure_usable()?;

        let sniffed = match self.sniffed_type() {
            Ok(sniffed) => sniffed,
            Err(err) => return self.fail(err),
        };

        let result = self.validator().validate_mime(sniffed);
        self.settle(result, "mime")
    }

    /// Verify the declared size against the staged file, then check bounds.
    pub fn validate_size(&mut self) -> UploadResult<u64> {
        self.ensure_usable()?;

        let actual = match self.on_disk_size() {
            Ok(actual) => actual,
            Err(err) => return self.fail(err),
        };

        let validator = self.validator();
        let result = validator
            .validate_declared_size(self.descriptor.declared_size(), actual)
            .and_then(|_| validator.validate_size(actual))
            .map(|_| actual);
        self.settle(result, "size")
    }

    /// Read width and height from the image header and check bounds.
    pub fn validate_dimension(&mut self) -> UploadResult<(u32, u32)> {
        self.ensure_usable()?;

        let (width, height) = match (self.descriptor.width, self.descriptor.height) {
            (Some(width), Some(height)) => (width, height),
            _ => match probe_dimensions(self.descriptor.temp_path(), self.descriptor.mime) {
                Ok((width, height)) => {
                    self.descriptor.width = Some(width);
                    self.descriptor.height = Some(height);
                    (width, height)
                }
                Err(err) => return self.fail(err),
            },
        };

        let result = self
            .validator()
            .validate_dimensions(width, height)
            .map(|_| (width, height));
        self.settle(result, "dimension")
    }

    /// Run every check in order, stopping at the first failure.
    pub fn is_valid(&mut self) -> UploadResult<()> {
        self.run_checks().map(|_| ())
    }

    fn run_checks(&mut self) -> UploadResult<CheckedImage> {
        let mime = self.validate_mime()?;
        let size = self.validate_size()?;
        let (width, height) = self.validate_dimension()?;

        if self.descriptor.state != UploadState::Persisted {
            self.descriptor.state = UploadState::Validated;
        }

        Ok(CheckedImage {
            mime,
            size,
            width,
            height,
        })
    }

    /// Validate the file and move it to `storage/name.type`.
    ///
    /// The descriptor stays readable afterwards. Calling `upload` again on a
    /// persisted upload returns the stored result without moving anything.
    pub fn upload(&mut self) -> UploadResult<UploadedImage> {
        self.ensure_usable()?;

        if let Some(image) = self.persisted_image() {
            return Ok(image);
        }

        let name = match self.descriptor.final_name.clone() {
            Some(name) => name,
            None => {
                let name = resolve_name(None);
                self.descriptor.final_name = Some(name.clone());
                name
            }
        };

        let checked = self.run_checks()?;

        let storage = match LocalStorage::resolve(
            self.uploader.policy.storage_dir.clone(),
            self.uploader.policy.storage_mode,
        ) {
            Ok(storage) => storage,
            Err(err) => return self.fail(err),
        };
        self.descriptor.storage_dir = Some(storage.dir().to_path_buf());

        let path = match storage.finalize(self.descriptor.temp_path(), &name, checked.mime) {
            Ok(path) => path,
            Err(err) => return self.fail(err),
        };
        self.descriptor.path = Some(path.clone());
        self.descriptor.state = UploadState::Persisted;
        self.uploader.last_error = None;

        tracing::info!(
            key = %self.descriptor.key(),
            name = %name,
            mime = %checked.mime,
            width = checked.width,
            height = checked.height,
            size_bytes = checked.size,
            path = %path.display(),
            "Image upload stored"
        );

        Ok(UploadedImage {
            name,
            mime: checked.mime,
            width: checked.width,
            height: checked.height,
            size: checked.size,
            storage: storage.dir().to_path_buf(),
            path,
        })
    }

    fn persisted_image(&self) -> Option<UploadedImage> {
        if self.descriptor.state != UploadState::Persisted {
            return None;
        }

        Some(UploadedImage {
            name: self.descriptor.final_name.clone()?,
            mime: self.descriptor.mime?,
            width: self.descriptor.width?,
            height: self.descriptor.height?,
            size: self.descriptor.actual_size?,
            storage: self.descriptor.storage_dir.clone()?,
            path: self.descriptor.path.clone()?,
        })
    }

    fn validator(&self) -> ImageValidator<'_> {
        ImageValidator::new(&self.uploader.policy)
    }

    fn sniffed_type(&mut self) -> UploadResult<Option<ImageType>> {
        if let Some(image_type) = self.descriptor.mime {
            return Ok(Some(image_type));
        }

        let sniffed = sniff_file(self.descriptor.temp_path())
            .map_err(|e| UploadError::Unreadable(e.to_string()))?;
        self.descriptor.mime = sniffed;
        Ok(sniffed)
    }

    fn on_disk_size(&mut self) -> UploadResult<u64> {
        if let Some(size) = self.descriptor.actual_size {
            return Ok(size);
        }

        let size = fs::metadata(self.descriptor.temp_path())
            .map_err(|e| UploadError::Unreadable(e.to_string()))?
            .len();
        self.descriptor.actual_size = Some(size);
        Ok(size)
    }

    fn ensure_usable(&mut self) -> UploadResult<()> {
        match &self.descriptor.error {
            Some(err) => {
                let err = err.clone();
                self.uploader.last_error = Some(err.clone());
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn settle<T>(&mut self, result: UploadResult<T>, check: &'static str) -> UploadResult<T> {
        match result {
            Ok(value) => {
                tracing::debug!(key = %self.descriptor.key(), check, "Validation check passed");
                self.uploader.last_error = None;
                Ok(value)
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail<T>(&mut self, err: UploadError) -> UploadResult<T> {
        tracing::warn!(key = %self.descriptor.key(), error = %err, "Upload rejected");
        self.descriptor.error = Some(err.clone());
        self.descriptor.state = UploadState::Failed;
        self.uploader.last_error = Some(err.clone());
        Err(err)
    }
}
