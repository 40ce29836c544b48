//! Test helpers: staging area, storage root and uploader setup.
//!
//! Run from workspace root: `cargo test -p palisade-upload --test upload_test`.

pub mod fixtures;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use palisade_core::UploadRecord;
use palisade_upload::ImageUploader;
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Owned temp directories for one test. Files are staged in `staging`,
/// uploads land under `store/uploads`.
pub struct TestEnv {
    pub staging: TempDir,
    pub store: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        init_tracing();
        Self {
            staging: TempDir::new().expect("Failed to create staging dir"),
            store: TempDir::new().expect("Failed to create storage dir"),
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.store.path().join("uploads")
    }

    /// Write `bytes` as a staged upload and describe it with its true size.
    pub fn stage(&self, name: &str, bytes: &[u8]) -> UploadRecord {
        let mut file = tempfile::Builder::new()
            .prefix("php")
            .tempfile_in(self.staging.path())
            .expect("Failed to create staged upload");
        file.write_all(bytes).expect("Failed to stage upload");
        let (_, path) = file.keep().expect("Failed to keep staged upload");
        UploadRecord::new(name, path, bytes.len() as u64)
    }

    /// Uploader over `records` storing into [`storage_dir`](Self::storage_dir).
    pub fn uploader<I>(&self, records: I) -> ImageUploader
    where
        I: IntoIterator<Item = (&'static str, UploadRecord)>,
    {
        let mut uploader = ImageUploader::new(records);
        uploader.set_storage_directory(self.storage_dir(), 0o755);
        uploader
    }
}

/// Files directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
