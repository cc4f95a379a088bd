//! File Store: the transient `uploads/` + `downloads/` directory pair.
//!
//! Retention is session-lifetime only: `initialize()` wipes both directories
//! at startup. Artifact overwrites are unguarded (last write wins).

pub mod naming;
pub mod records;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::storage::naming::{validate_plain_name, UploadNames};

pub const UPLOADS_DIR: &str = "uploads";
pub const DOWNLOADS_DIR: &str = "downloads";

#[derive(Debug, Clone)]
pub struct FileStore {
    uploads_dir: PathBuf,
    downloads_dir: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            uploads_dir: root.join(UPLOADS_DIR),
            downloads_dir: root.join(DOWNLOADS_DIR),
        }
    }

    #[cfg(test)]
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    #[cfg(test)]
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Removes both directories (if present) and recreates them empty.
    ///
    /// Idempotent: safe on a fresh root, on an existing root, and when called
    /// repeatedly.
    pub async fn initialize(&self) -> std::io::Result<()> {
        for dir in [&self.uploads_dir, &self.downloads_dir] {
            match fs::remove_dir_all(dir).await {
                Ok(()) => info!("Cleaned {}", dir.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} absent, nothing to clean", dir.display())
                }
                Err(e) => return Err(e),
            }
            fs::create_dir_all(dir).await?;
        }
        info!(
            uploads = %self.uploads_dir.display(),
            downloads = %self.downloads_dir.display(),
            "File store ready"
        );
        Ok(())
    }

    /// Persists the original upload under a fresh timestamp.
    pub async fn save_upload(&self, original_name: &str, bytes: &[u8]) -> Result<UploadNames, AppError> {
        let names = UploadNames::new(chrono::Utc::now().timestamp_millis(), original_name);

        fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create uploads directory: {e}")))?;

        let path = self.uploads_dir.join(&names.upload_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to save upload: {e}")))?;

        debug!(path = %path.display(), size = bytes.len(), "Upload saved");
        Ok(names)
    }

    /// Path of an artifact inside `downloads/`. The name must be a plain component.
    pub fn artifact_path(&self, artifact_name: &str) -> Result<PathBuf, AppError> {
        let name = validate_plain_name(artifact_name)?;
        Ok(self.downloads_dir.join(name))
    }

    /// Writes (or overwrites) an artifact.
    pub async fn write_artifact(&self, artifact_name: &str, content: &str) -> Result<PathBuf, AppError> {
        let path = self.artifact_path(artifact_name)?;

        fs::create_dir_all(&self.downloads_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create downloads directory: {e}")))?;
        fs::write(&path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {artifact_name}: {e}")))?;

        debug!(path = %path.display(), size = content.len(), "Artifact written");
        Ok(path)
    }

    pub async fn read_artifact(&self, artifact_name: &str) -> Result<String, AppError> {
        let path = self.artifact_path(artifact_name)?;
        fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {artifact_name}: {e}")))
    }
}
