use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::error::ScanError;

/// Clones repositories by invoking the external version-control client.
/// Authentication and transports are whatever the ambient git supports; no
/// retries, no shallow clones.
pub struct RepoFetcher {
    git_bin: String,
}

impl RepoFetcher {
    pub fn new(git_bin: impl Into<String>) -> Self {
        Self {
            git_bin: git_bin.into(),
        }
    }

    /// Clone `url` into `target`. Any failure (unreachable URL, auth
    /// required, non-empty target) surfaces as [`ScanError::Fetch`] with
    /// git's own message.
    pub async fn clone(&self, url: &str, target: &Path) -> Result<(), ScanError> {
        debug!(%url, target = %target.display(), "cloning repository");

        let output = Command::new(&self.git_bin)
            .arg("clone")
            .arg(url)
            .arg(target)
            .output()
            .await
            .map_err(|err| ScanError::Fetch {
                url: url.to_string(),
                message: format!("could not run {}: {}", self.git_bin, err),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("clone failed")
                .trim()
                .to_string();
            return Err(ScanError::Fetch {
                url: url.to_string(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clone_failure_is_a_fetch_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = RepoFetcher::new("git");
        let err = fetcher
            .clone(
                "file:///definitely/not/a/repository",
                &dir.path().join("checkout"),
            )
            .await
            .unwrap_err();
        match err {
            ScanError::Fetch { url, message } => {
                assert_eq!(url, "file:///definitely/not/a/repository");
                assert!(!message.is_empty());
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_client_is_a_fetch_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = RepoFetcher::new("definitely-not-a-git-binary");
        let err = fetcher
            .clone("https://example.com/repo.git", &dir.path().join("checkout"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Fetch { .. }));
    }
}
