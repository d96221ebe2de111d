use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::error;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ScanError;
use crate::models::{ScanRequest, ScanResult, ScanType};
use crate::orchestrator::{progress_percent, ScanEvent, ScanOrchestrator};

/// Snapshot of one scan job, as returned to a polling caller.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub progress: u8,
    pub results: Vec<ScanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct JobEntry {
    progress: u8,
    results: Vec<ScanResult>,
    error: Option<String>,
    created: Instant,
    events: broadcast::Sender<ScanEvent>,
}

type JobMap = HashMap<String, JobEntry>;

/// The request boundary: accepts batch scan submissions, runs them in the
/// background, and serves polling and event-stream reads keyed by scan id.
///
/// The job store is bounded: entries expire after a TTL and the oldest
/// entry is evicted when the store is full, so it cannot grow for the
/// lifetime of the process.
pub struct ScanService {
    orchestrator: Arc<ScanOrchestrator>,
    jobs: Arc<Mutex<JobMap>>,
    ttl: Duration,
    max_jobs: usize,
}

impl ScanService {
    pub fn new(config: &Config) -> Self {
        Self {
            orchestrator: Arc::new(ScanOrchestrator::new(config)),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_secs(config.jobs.ttl_secs),
            max_jobs: config.jobs.max_jobs.max(1),
        }
    }

    /// Validate and accept a batch request, returning its scan id
    /// immediately. The batch itself runs as a background task; repository
    /// results and progress are folded into the job entry as each
    /// repository completes, in input order.
    pub async fn submit(&self, request: ScanRequest) -> Result<String, ScanError> {
        if request.repositories.is_empty() {
            return Err(ScanError::InvalidRequest(
                "repositories must be a non-empty list".to_string(),
            ));
        }

        let scan_id = Uuid::new_v4().to_string();
        let (event_tx, _) = broadcast::channel(64);

        {
            let mut jobs = self.jobs.lock().await;
            evict_expired(&mut jobs, self.ttl);
            while jobs.len() >= self.max_jobs {
                evict_oldest(&mut jobs);
            }
            jobs.insert(
                scan_id.clone(),
                JobEntry {
                    progress: 0,
                    results: Vec::new(),
                    error: None,
                    created: Instant::now(),
                    events: event_tx.clone(),
                },
            );
        }

        let orchestrator = self.orchestrator.clone();
        let jobs = self.jobs.clone();
        let id = scan_id.clone();
        let ScanRequest {
            repositories,
            scan_type,
        } = request;

        tokio::spawn(async move {
            let driver = drive_batch(
                orchestrator,
                jobs.clone(),
                id.clone(),
                repositories,
                scan_type,
                event_tx,
            );

            // A panic in the driver is a job-level error, not a crash.
            if let Err(panic) = std::panic::AssertUnwindSafe(driver).catch_unwind().await {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "scan driver panicked".to_string());
                error!(scan_id = %id, %message, "batch driver failed");
                let mut jobs = jobs.lock().await;
                if let Some(entry) = jobs.get_mut(&id) {
                    entry.error = Some(ScanError::Internal(message).to_string());
                }
            }
        });

        Ok(scan_id)
    }

    /// Current progress, accumulated results, and job-level error for a
    /// scan id. `None` for unknown or expired ids.
    pub async fn status(&self, scan_id: &str) -> Option<JobStatus> {
        let mut jobs = self.jobs.lock().await;
        evict_expired(&mut jobs, self.ttl);
        jobs.get(scan_id).map(|entry| JobStatus {
            progress: entry.progress,
            results: entry.results.clone(),
            error: entry.error.clone(),
        })
    }

    /// Subscribe to the job's live event stream: one `progress` event per
    /// completed repository, then `complete`.
    pub async fn subscribe(&self, scan_id: &str) -> Option<broadcast::Receiver<ScanEvent>> {
        let mut jobs = self.jobs.lock().await;
        evict_expired(&mut jobs, self.ttl);
        jobs.get(scan_id).map(|entry| entry.events.subscribe())
    }

    /// Synchronous boundary variant: run the whole batch and return the
    /// results directly, no job entry involved.
    pub async fn scan_all(
        &self,
        urls: &[String],
        scan_type: ScanType,
    ) -> Result<Vec<ScanResult>, ScanError> {
        if urls.is_empty() {
            return Err(ScanError::InvalidRequest(
                "repositories must be a non-empty list".to_string(),
            ));
        }
        let (tx, _rx) = mpsc::unbounded_channel();
        Ok(self.orchestrator.run_batch(urls, scan_type, &tx).await)
    }
}

/// Sequentially scan every repository of one job, updating the job entry
/// and broadcasting events after each completes.
async fn drive_batch(
    orchestrator: Arc<ScanOrchestrator>,
    jobs: Arc<Mutex<JobMap>>,
    scan_id: String,
    repositories: Vec<String>,
    scan_type: ScanType,
    events: broadcast::Sender<ScanEvent>,
) {
    let total = repositories.len();

    for (index, url) in repositories.iter().enumerate() {
        let result = orchestrator.scan_repository(url, scan_type).await;
        let progress = progress_percent(index + 1, total);

        let _ = events.send(ScanEvent::Repository {
            repository: url.clone(),
            success: result.success,
        });
        let _ = events.send(ScanEvent::Progress { progress });

        let mut jobs = jobs.lock().await;
        match jobs.get_mut(&scan_id) {
            Some(entry) => {
                entry.results.push(result);
                entry.progress = progress;
            }
            // Evicted mid-run; nobody can read the rest, stop scanning.
            None => return,
        }
    }

    let _ = events.send(ScanEvent::Complete);
}

fn evict_expired(jobs: &mut JobMap, ttl: Duration) {
    jobs.retain(|_, entry| entry.created.elapsed() < ttl);
}

fn evict_oldest(jobs: &mut JobMap) {
    let oldest = jobs
        .iter()
        .min_by_key(|(_, entry)| entry.created)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        jobs.remove(&id);
    }
}
