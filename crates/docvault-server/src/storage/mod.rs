//! Project-scoped asset storage
//!
//! Places uploaded bytes at `{upload_root}/{project_id}/{filename}`. Writes
//! are atomic from the caller's perspective: bytes go to a temporary file in
//! the project directory and are renamed over the destination, so either the
//! full content lands at the final path or nothing does. A name clash is an
//! overwrite (last write wins); deduplication is deliberately not provided.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use uuid::Uuid;

pub mod config;

pub use config::StorageConfig;

#[derive(Clone)]
pub struct AssetStorage {
    upload_root: PathBuf,
}

impl AssetStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            upload_root: config.upload_root,
        }
    }

    /// The destination path for a project's asset.
    pub fn asset_path(&self, project_id: i64, filename: &str) -> PathBuf {
        self.project_dir(project_id).join(filename)
    }

    fn project_dir(&self, project_id: i64) -> PathBuf {
        self.upload_root.join(project_id.to_string())
    }

    /// Write an asset's full byte stream to project-scoped storage and return
    /// the destination path.
    ///
    /// The project directory is created if missing; a concurrent create of the
    /// same directory is not an error.
    #[instrument(skip(self, content), fields(size = content.len()))]
    pub async fn store(&self, project_id: i64, filename: &str, content: &[u8]) -> io::Result<PathBuf> {
        let filename = sanitize_filename(filename)?;

        let project_dir = self.project_dir(project_id);
        tokio::fs::create_dir_all(&project_dir).await?;

        let dest = project_dir.join(filename);
        let tmp = project_dir.join(format!(".{}.{}.tmp", filename, Uuid::new_v4()));

        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            // Leave nothing behind on a failed rename
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        debug!(path = %dest.display(), "Asset written");

        Ok(dest)
    }
}

/// Reduce an uploaded filename to its final path component so a crafted name
/// cannot escape the project directory.
fn sanitize_filename(filename: &str) -> io::Result<&str> {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid filename: {}", filename),
            )
        })
}
