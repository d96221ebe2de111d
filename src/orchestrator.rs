use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::error::ScanError;
use crate::fetcher::RepoFetcher;
use crate::models::{ScanReport, ScanResult, ScanType};
use crate::scanner::DependencyScanner;
use crate::workspace::Workspace;

/// Events published while a batch runs, one `progress` per completed
/// repository and a terminal `complete`. The serialized form is the
/// progress wire shape: `{"type":"progress","progress":N}` ...
/// `{"type":"complete"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanEvent {
    Progress { progress: u8 },
    Repository { repository: String, success: bool },
    Complete,
}

/// Percentage of a batch completed after `completed` of `total`
/// repositories, rounded to the nearest integer.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Drives one batch of repository scans: workspace per repository, clone,
/// scan, guaranteed workspace release, sequential processing.
pub struct ScanOrchestrator {
    fetcher: RepoFetcher,
    scanner: DependencyScanner,
}

impl ScanOrchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RepoFetcher::new(config.scan.git_bin.clone()),
            scanner: DependencyScanner::new(config.scan.skip_dirs.clone()),
        }
    }

    /// Clone one repository into a fresh workspace and scan it. Every
    /// failure path (workspace, clone, scan, cleanup) is captured into the
    /// returned result; this never propagates an error.
    pub async fn scan_repository(&self, url: &str, scan_type: ScanType) -> ScanResult {
        let mut workspace = match Workspace::create().await {
            Ok(workspace) => workspace,
            Err(err) => return ScanResult::failed(url, scan_type, err.to_string()),
        };

        let outcome = self.clone_and_scan(url, scan_type, &workspace).await;
        let cleanup = workspace.cleanup().await;

        match (outcome, cleanup) {
            (Ok(report), Ok(())) => ScanResult::completed(url, scan_type, report),
            (Err(err), _) => ScanResult::failed(url, scan_type, err.to_string()),
            (Ok(_), Err(err)) => ScanResult::failed(url, scan_type, err.to_string()),
        }
    }

    async fn clone_and_scan(
        &self,
        url: &str,
        scan_type: ScanType,
        workspace: &Workspace,
    ) -> Result<ScanReport, ScanError> {
        self.fetcher.clone(url, workspace.path()).await?;
        self.scanner.scan(workspace.path(), scan_type)
    }

    /// Process `urls` strictly in order, one clone and scan at a time.
    /// Results come back in input order; one repository failing does not
    /// stop the rest. Progress and completion events go out on `events`
    /// as each repository finishes (send failures are ignored, nobody may
    /// be listening).
    pub async fn run_batch(
        &self,
        urls: &[String],
        scan_type: ScanType,
        events: &mpsc::UnboundedSender<ScanEvent>,
    ) -> Vec<ScanResult> {
        let total = urls.len();
        let mut results = Vec::with_capacity(total);

        for (index, url) in urls.iter().enumerate() {
            info!(%url, "scanning repository");
            let result = self.scan_repository(url, scan_type).await;
            let _ = events.send(ScanEvent::Repository {
                repository: url.clone(),
                success: result.success,
            });
            let _ = events.send(ScanEvent::Progress {
                progress: progress_percent(index + 1, total),
            });
            results.push(result);
        }

        let _ = events.send(ScanEvent::Complete);
        results
    }
}
