use std::path::PathBuf;

use thiserror::Error;

/// Component-level failures of the scanning pipeline.
///
/// Fetch and parse errors are captured into the affected repository's
/// [`crate::models::ScanResult`] and never abort a batch; workspace errors
/// are fatal for the attempt; invalid requests are rejected before any
/// side effect.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to clone {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
