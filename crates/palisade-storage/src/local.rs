use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use palisade_core::{ImageType, UploadError, UploadResult};

/// Local filesystem storage directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Resolve the storage directory, creating it (recursively, with `mode`)
    /// when it does not exist yet.
    ///
    /// An existing directory must be writable. A missing one must be
    /// creatable, meaning its nearest existing ancestor is a writable
    /// directory. Both cases fail with [`UploadError::StorageNotWritable`]
    /// otherwise; a creation that still fails after those checks, or a path
    /// that exists but is not a directory, yields
    /// [`UploadError::StorageCreateFailed`].
    pub fn resolve(dir: impl Into<PathBuf>, mode: u32) -> UploadResult<Self> {
        let dir = dir.into();

        if dir.exists() {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "Storage path exists but is not a directory");
                return Err(UploadError::StorageCreateFailed(dir));
            }
            if !is_writable(&dir) {
                tracing::warn!(dir = %dir.display(), "Storage directory is not writable");
                return Err(UploadError::StorageNotWritable(dir));
            }
            return Ok(Self { dir });
        }

        let creatable = nearest_existing_ancestor(&dir)
            .map(|ancestor| ancestor.is_dir() && is_writable(ancestor))
            .unwrap_or(false);
        if !creatable {
            tracing::warn!(dir = %dir.display(), "Storage directory cannot be created here");
            return Err(UploadError::StorageNotWritable(dir));
        }

        create_dir_all(&dir, mode).map_err(|e| {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to create storage directory");
            UploadError::StorageCreateFailed(dir.clone())
        })?;

        tracing::debug!(
            dir = %dir.display(),
            mode = %format!("{:o}", mode),
            "Created storage directory"
        );

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for a stored image: `{dir}/{name}.{type}`.
    pub fn path_for(&self, name: &str, image_type: ImageType) -> PathBuf {
        self.dir.join(format!("{}.{}", name, image_type.extension()))
    }

    /// Move the staged file at `source` to `{dir}/{name}.{type}`.
    ///
    /// The move is a rename, so it is atomic and the destination never shows
    /// a partially written file. When `source` lives on another filesystem the
    /// content is first copied into a temporary file inside the storage
    /// directory, which is then renamed into place.
    pub fn finalize(
        &self,
        source: &Path,
        name: &str,
        image_type: ImageType,
    ) -> UploadResult<PathBuf> {
        let destination = self.path_for(name, image_type);
        let start = Instant::now();

        match fs::rename(source, &destination) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Staged file is on another filesystem, copying through storage directory"
                );
                self.stage_and_rename(source, &destination)
                    .map_err(|e| persist_failed(&destination, e))?;
            }
            Err(e) => return Err(persist_failed(&destination, e)),
        }

        tracing::info!(
            path = %destination.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage finalize successful"
        );

        Ok(destination)
    }

    pub(crate) fn stage_and_rename(&self, source: &Path, destination: &Path) -> io::Result<()> {
        let mut input = fs::File::open(source)?;
        let mut staged = tempfile::Builder::new()
            .prefix(".palisade-")
            .tempfile_in(&self.dir)?;

        io::copy(&mut input, staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        fs::set_permissions(staged.path(), input.metadata()?.permissions())?;

        staged.persist(destination).map_err(|e| e.error)?;

        if let Err(e) = fs::remove_file(source) {
            tracing::warn!(
                source = %source.display(),
                error = %e,
                "Failed to remove staged upload after copying it into storage"
            );
        }

        Ok(())
    }
}

fn persist_failed(destination: &Path, err: io::Error) -> UploadError {
    tracing::warn!(path = %destination.display(), error = %err, "Failed to persist upload");
    UploadError::PersistFailed {
        path: destination.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Closest ancestor of `path` that exists. A relative path's implicit parent
/// is the current directory.
fn nearest_existing_ancestor(path: &Path) -> Option<&Path> {
    let mut current = path;
    while let Some(parent) = current.parent() {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if parent.exists() {
            return Some(parent);
        }
        current = parent;
    }
    None
}

/// Search permission is added wherever read permission is granted, so a
/// mode like `0666` still produces a directory files can be moved into.
fn directory_mode(mode: u32) -> u32 {
    mode | ((mode & 0o444) >> 2)
}

#[cfg(unix)]
fn create_dir_all(dir: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(directory_mode(mode))
        .create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path, _mode: u32) -> io::Result<()> {
    fs::DirBuilder::new().recursive(true).create(dir)
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    rustix::fs::access(path, rustix::fs::Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false)
}
