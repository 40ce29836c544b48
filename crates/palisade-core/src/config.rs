//! Configuration module
//!
//! [`UploadPolicy`] holds every limit the upload pipeline enforces. Hosts
//! either build one in code (starting from `Default`) or load it from the
//! environment with [`UploadPolicy::from_env`].

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_SIZE_BYTES, DEFAULT_MAX_WIDTH,
    DEFAULT_MIN_SIZE_BYTES, DEFAULT_STORAGE_DIR, DEFAULT_STORAGE_MODE,
};

/// Limits applied to every upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted image types, in the order they are listed in error messages
    pub allowed_mime_types: Vec<String>,
    pub min_size_bytes: u64,
    pub max_size_bytes: u64,
    pub max_width: u32,
    pub max_height: u32,
    /// Target directory, created on demand
    pub storage_dir: PathBuf,
    /// Permission bits used when creating the storage directory
    pub storage_mode: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_mode: DEFAULT_STORAGE_MODE,
        }
    }
}

impl UploadPolicy {
    /// Load the policy from `UPLOAD_*` environment variables, reading a
    /// `.env` file first if one exists. Missing or unparseable values fall
    /// back to the defaults.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let policy = Self::from_lookup(|key| env::var(key).ok());
        policy.validate()?;
        Ok(policy)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let allowed_mime_types = lookup("UPLOAD_ALLOWED_MIME_TYPES")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_mime_types);

        let storage_mode = lookup("UPLOAD_STORAGE_MODE")
            .and_then(|raw| {
                let digits = raw.trim().trim_start_matches("0o");
                u32::from_str_radix(digits, 8)
                    .map_err(|e| {
                        tracing::warn!(
                            value = %raw,
                            error = %e,
                            "Ignoring invalid UPLOAD_STORAGE_MODE"
                        );
                    })
                    .ok()
            })
            .unwrap_or(defaults.storage_mode);

        Self {
            allowed_mime_types,
            min_size_bytes: parse_or(&lookup, "UPLOAD_MIN_SIZE_BYTES", defaults.min_size_bytes),
            max_size_bytes: parse_or(&lookup, "UPLOAD_MAX_SIZE_BYTES", defaults.max_size_bytes),
            max_width: parse_or(&lookup, "UPLOAD_MAX_WIDTH", defaults.max_width),
            max_height: parse_or(&lookup, "UPLOAD_MAX_HEIGHT", defaults.max_height),
            storage_dir: lookup("UPLOAD_STORAGE_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_mode,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.allowed_mime_types.is_empty() {
            return Err(anyhow::anyhow!("At least one allowed image type is required"));
        }

        if self.min_size_bytes > self.max_size_bytes {
            return Err(anyhow::anyhow!(
                "Minimum upload size ({}) exceeds maximum upload size ({})",
                self.min_size_bytes,
                self.max_size_bytes
            ));
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err(anyhow::anyhow!(
                "Dimension bounds must be positive (got {}x{})",
                self.max_width,
                self.max_height
            ));
        }

        if self.storage_mode > 0o7777 {
            return Err(anyhow::anyhow!(
                "Invalid storage permission bits: {:o}",
                self.storage_mode
            ));
        }

        Ok(())
    }

    /// Whether `mime` is in the allow-list (case-insensitive).
    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable upload setting");
            default
        }),
        None => default,
    }
}
