//! Image files on disk as pipeline uploads.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::ImageUpload;
use tracing::{debug, warn};

/// A photograph read from the local filesystem.
///
/// When `remove_after` is set the file is deleted on release, whether or not
/// acquisition succeeded.
#[derive(Debug)]
pub struct FileUpload {
    path: PathBuf,
    file_name: String,
    size: Option<u64>,
    remove_after: bool,
    released: bool,
}

impl FileUpload {
    /// Describes `path` without reading it. A missing file is not an error
    /// here: the read fails later and acquisition falls back.
    pub async fn open(path: impl Into<PathBuf>, remove_after: bool) -> Self {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await.ok().map(|m| m.len());
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            size,
            remove_after,
            released: false,
        }
    }

    /// Location of the image on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[async_trait]
impl ImageUpload for FileUpload {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn size_hint(&self) -> Option<u64> {
        self.size
    }

    async fn read(&mut self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    async fn release(&mut self) {
        if self.is_released() {
            return;
        }
        self.released = true;
        if !self.remove_after {
            return;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path().display(), "Removed uploaded image"),
            Err(e) => warn!(path = %self.path().display(), error = %e, "Failed to remove uploaded image"),
        }
    }
}
