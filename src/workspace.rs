use std::path::{Path, PathBuf};

use tracing::error;
use uuid::Uuid;

use crate::error::ScanError;

/// A disposable directory under the system temp root holding one cloned
/// repository. Every scan job gets its own workspace, so a failed cleanup
/// can never corrupt a sibling.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Allocate a fresh `repo-scan-<random>` directory.
    pub async fn create() -> Result<Self, ScanError> {
        let path = std::env::temp_dir().join(format!("repo-scan-{}", Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            cleaned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively remove the workspace. Idempotent. A failure here is
    /// fatal for the scan attempt that used this workspace.
    pub async fn cleanup(&mut self) -> Result<(), ScanError> {
        if self.cleaned {
            return Ok(());
        }
        if let Err(err) = tokio::fs::remove_dir_all(&self.path).await {
            error!(path = %self.path.display(), %err, "failed to remove workspace");
            return Err(ScanError::Workspace(err));
        }
        self.cleaned = true;
        Ok(())
    }
}

impl Drop for Workspace {
    // Backstop for callers that drop without cleanup.
    fn drop(&mut self) {
        if !self.cleaned {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
