//! Per-upload state

use std::path::{Path, PathBuf};

use palisade_core::{ImageType, UploadError, UploadRecord};

/// Where an upload is in its lifecycle. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Selected,
    Validated,
    Persisted,
    Failed,
}

/// Everything known about one selected upload.
///
/// Facts derived from the file (type, dimensions, on-disk size) are filled in
/// once by the validation steps and never recomputed.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    key: String,
    raw_name: String,
    temp_path: PathBuf,
    declared_size: u64,
    pub(crate) mime: Option<ImageType>,
    pub(crate) actual_size: Option<u64>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) final_name: Option<String>,
    pub(crate) storage_dir: Option<PathBuf>,
    pub(crate) path: Option<PathBuf>,
    pub(crate) error: Option<UploadError>,
    pub(crate) state: UploadState,
}

impl UploadDescriptor {
    pub(crate) fn from_record(key: &str, record: &UploadRecord) -> Self {
        Self {
            key: key.to_string(),
            raw_name: record.name.clone(),
            temp_path: record.tmp_name.clone(),
            declared_size: record.size,
            mime: None,
            actual_size: None,
            width: None,
            height: None,
            final_name: None,
            storage_dir: None,
            path: None,
            error: None,
            state: UploadState::Selected,
        }
    }

    /// Form field the upload was submitted under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Client-supplied filename (untrusted)
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }

    pub fn mime(&self) -> Option<ImageType> {
        self.mime
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn final_name(&self) -> Option<&str> {
        self.final_name.as_deref()
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }
}
