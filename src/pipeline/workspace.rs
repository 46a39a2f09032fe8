//! Scoped per-batch scratch directory

use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Directory exclusively owned by one batch
///
/// Removed with everything in it when dropped, so early returns and errors
/// cannot leave files behind. [`Workspace::close`] does the same removal but
/// logs a failure instead of ignoring it.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace
    pub fn create(config: &WorkspaceConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.prefix);

        let dir = match &config.parent_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Io(std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to create workspace parent '{}': {}",
                            parent.display(),
                            e
                        ),
                    ))
                })?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create workspace: {}", e),
            ))
        })?;

        debug!(path = ?dir.path(), "workspace created");
        Ok(Self { dir })
    }

    /// Root of the workspace
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Output path of item `index` (1-based); unique per item
    pub fn item_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("video_{index}.mp4"))
    }

    /// Remove one item's output early; a missing file is not an error
    pub async fn discard(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(?path, "removed item output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(?path, error = %e, "failed to remove item output"),
        }
    }

    /// Remove the workspace and its contents
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(?path, "workspace removed"),
            Err(e) => warn!(?path, error = %e, "failed to remove workspace"),
        }
    }
}
