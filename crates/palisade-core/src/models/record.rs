use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};

/// Status reported by the multipart upload transport for one submitted file.
///
/// The numeric codes are the ones hosting layers conventionally put in the
/// `error` field of an upload record. Code 5 is unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    Ok,
    ServerSizeLimit,
    ClientSizeLimit,
    Partial,
    NoFile,
    NoTempDir,
    CantWrite,
    ExtensionBlocked,
}

impl TransportStatus {
    pub fn code(self) -> i32 {
        match self {
            TransportStatus::Ok => 0,
            TransportStatus::ServerSizeLimit => 1,
            TransportStatus::ClientSizeLimit => 2,
            TransportStatus::Partial => 3,
            TransportStatus::NoFile => 4,
            TransportStatus::NoTempDir => 6,
            TransportStatus::CantWrite => 7,
            TransportStatus::ExtensionBlocked => 8,
        }
    }

    /// Message shown to the end user when the transport failed. Empty for `Ok`.
    pub fn message(self) -> &'static str {
        match self {
            TransportStatus::Ok => "",
            TransportStatus::ServerSizeLimit => {
                "Image is larger than the specified amount set by the server"
            }
            TransportStatus::ClientSizeLimit => {
                "Image is larger than the specified amount specified by browser"
            }
            TransportStatus::Partial => "Image could not be fully uploaded. Please try again later",
            TransportStatus::NoFile => "Image is not found",
            TransportStatus::NoTempDir => {
                "Can't write to disk, due to server configuration ( No tmp dir found )"
            }
            TransportStatus::CantWrite => {
                "Failed to write file to disk. Please check you file permissions"
            }
            TransportStatus::ExtensionBlocked => {
                "A server extension has halted this file upload process"
            }
        }
    }

    pub fn is_ok(self) -> bool {
        self == TransportStatus::Ok
    }
}

impl TryFrom<i32> for TransportStatus {
    type Error = UploadError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TransportStatus::Ok),
            1 => Ok(TransportStatus::ServerSizeLimit),
            2 => Ok(TransportStatus::ClientSizeLimit),
            3 => Ok(TransportStatus::Partial),
            4 => Ok(TransportStatus::NoFile),
            6 => Ok(TransportStatus::NoTempDir),
            7 => Ok(TransportStatus::CantWrite),
            8 => Ok(TransportStatus::ExtensionBlocked),
            other => Err(UploadError::UnknownTransportStatus(other)),
        }
    }
}

/// Raw record for one submitted file, as supplied by the request layer.
///
/// Everything in here is untrusted. `content_type` is carried for
/// completeness but never consulted during validation, and `size` is checked
/// against the staged file before it is compared with the configured bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Client-supplied original filename
    pub name: String,
    /// Client-supplied content type
    #[serde(rename = "type", default)]
    pub content_type: String,
    /// Path of the staged temporary file
    pub tmp_name: PathBuf,
    /// Transport status code
    #[serde(default)]
    pub error: i32,
    /// Declared size in bytes
    pub size: u64,
}

impl UploadRecord {
    pub fn new(name: impl Into<String>, tmp_name: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type: String::new(),
            tmp_name: tmp_name.into(),
            error: TransportStatus::Ok.code(),
            size,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_error(mut self, code: i32) -> Self {
        self.error = code;
        self
    }

    /// Decode the transport status code.
    pub fn status(&self) -> UploadResult<TransportStatus> {
        TransportStatus::try_from(self.error)
    }
}
