use super::ImageSource;
use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// Directory that receives uploaded multipart files for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// An uploaded file on disk. Dropping the guard deletes the file if it is still there.
#[derive(Debug)]
pub struct TempUpload {
    path: TempPath,
    content_type: Option<String>,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn persist(&self, bytes: &[u8], content_type: Option<String>) -> Result<TempUpload> {
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?;
        let path = file.into_temp_path();
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored {} byte upload at {}", bytes.len(), path.display());
        Ok(TempUpload { path, content_type })
    }
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> ImageSource {
        ImageSource::Upload {
            path: self.path.to_path_buf(),
            content_type: self.content_type.clone(),
        }
    }

    /// Deletes the file now. Succeeds when it was already consumed.
    pub fn release(self) -> Result<()> {
        let path = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove upload {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }
}
