use std::path::{Path, PathBuf};

use tracing::{error, info};
use uuid::Uuid;

use crate::common::StorageError;

/// Upload file types accepted for images and favicons.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "ico"];

/// Per-project file storage: `<root>/<project_id>/<folder>/<stored_filename>`,
/// where folder is one of the disk folders in [`crate::render::paths`].
/// Only generated stored filenames are written; user-supplied names are
/// validated before any path is built.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

pub fn allowed_file(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Rejects anything that could escape its folder: separators, parent
/// references, empty names.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

/// Generates a unique on-disk name keeping only the original's
/// extension. Returns `None` for disallowed file types.
pub fn generate_stored_filename(original: &str, prefix: Option<&str>) -> Option<String> {
    if !allowed_file(original) {
        return None;
    }
    let ext = file_extension(original)?;
    let stem = Uuid::new_v4().simple().to_string();
    match prefix {
        Some(prefix) => Some(format!("{}_{}.{}", prefix, &stem[..8], ext)),
        None => Some(format!("{}.{}", stem, ext)),
    }
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_folder(&self, project_id: Uuid, folder: &str) -> PathBuf {
        self.root.join(project_id.to_string()).join(folder)
    }

    pub fn save(
        &self,
        project_id: Uuid,
        folder: &str,
        stored_filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        if !is_safe_filename(stored_filename) {
            return Err(StorageError::UnsafeFilename(stored_filename.to_string()));
        }
        let dir = self.project_folder(project_id, folder);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(stored_filename);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), "stored uploaded file");
        Ok(path)
    }

    /// Resolves a filename for serving, rejecting traversal attempts
    /// before any file access.
    pub fn resolve_for_serving(
        &self,
        project_id: Uuid,
        folder: &str,
        filename: &str,
    ) -> Result<PathBuf, StorageError> {
        if !is_safe_filename(filename) {
            return Err(StorageError::UnsafeFilename(filename.to_string()));
        }
        Ok(self.project_folder(project_id, folder).join(filename))
    }

    /// Best-effort removal; a missing file is not an error, anything
    /// else is logged by the caller and reported without aborting.
    pub fn delete(
        &self,
        project_id: Uuid,
        folder: &str,
        stored_filename: &str,
    ) -> Result<(), StorageError> {
        if !is_safe_filename(stored_filename) {
            return Err(StorageError::UnsafeFilename(stored_filename.to_string()));
        }
        let path = self.project_folder(project_id, folder).join(stored_filename);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to delete stored file");
                Err(e.into())
            }
        }
    }

    /// Removes a project's whole upload tree when the project is
    /// deleted.
    pub fn remove_project_files(&self, project_id: Uuid) -> Result<(), StorageError> {
        let dir = self.root.join(project_id.to_string());
        if !dir.exists() {
            return Ok(());
        }
        std::fs::remove_dir_all(&dir)?;
        info!(path = %dir.display(), "removed project upload folder");
        Ok(())
    }
}
