use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ecosystem a dependency was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Npm,
    Pip,
    Maven,
    System,
    Other,
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyType::Npm => write!(f, "npm"),
            DependencyType::Pip => write!(f, "pip"),
            DependencyType::Maven => write!(f, "maven"),
            DependencyType::System => write!(f, "system"),
            DependencyType::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "currentVersion")]
    pub current_version: String,
    #[serde(rename = "type")]
    pub kind: DependencyType,
    /// Manifest file the dependency was declared in.
    #[serde(rename = "path", skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl Dependency {
    /// Identity used for deduplication: two mentions of the same package in
    /// the same ecosystem collapse to the first one seen.
    pub fn dedup_key(&self) -> (DependencyType, String) {
        (self.kind, self.name.clone())
    }
}

/// Support status of a runtime or base image. Always `Ok` today; no EOL
/// database is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Ok,
    Partial,
    Eol,
}

/// A detected language/runtime requirement, e.g. a Node engine constraint
/// or the Java version a POM declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: String,
    pub status: VersionStatus,
}

/// Base image declared by a container build file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerInfo {
    #[serde(rename = "baseImage")]
    pub base_image: String,
    pub version: String,
    pub status: VersionStatus,
}

/// Requested scan mode. Exactly two values; anything else is rejected at
/// the boundary. `Incremental` is accepted but currently behaves like
/// `Full` (reserved for future semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Full,
    Incremental,
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanType::Full => write!(f, "full"),
            ScanType::Incremental => write!(f, "incremental"),
        }
    }
}

/// Everything one repository scan produced before it is wrapped into a
/// [`ScanResult`].
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub dependencies: Vec<Dependency>,
    pub runtimes: Vec<RuntimeInfo>,
    pub docker: Vec<DockerInfo>,
}

/// Outcome of one repository scan attempt. Created once per repository and
/// immutable afterwards; a failed clone or scan still yields exactly one
/// result entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(rename = "repositoryUrl")]
    pub repository_url: String,
    #[serde(rename = "scanType")]
    pub scan_type: ScanType,
    /// RFC 3339 timestamp of when the attempt finished.
    pub timestamp: String,
    pub dependencies: Vec<Dependency>,
    pub runtimes: Vec<RuntimeInfo>,
    pub docker: Vec<DockerInfo>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    pub fn completed(url: &str, scan_type: ScanType, report: ScanReport) -> Self {
        ScanResult {
            repository_url: url.to_string(),
            scan_type,
            timestamp: chrono::Utc::now().to_rfc3339(),
            dependencies: report.dependencies,
            runtimes: report.runtimes,
            docker: report.docker,
            success: true,
            error: None,
        }
    }

    pub fn failed(url: &str, scan_type: ScanType, message: String) -> Self {
        ScanResult {
            repository_url: url.to_string(),
            scan_type,
            timestamp: chrono::Utc::now().to_rfc3339(),
            dependencies: Vec::new(),
            runtimes: Vec::new(),
            docker: Vec::new(),
            success: false,
            error: Some(message),
        }
    }
}

/// A batch scan submission: repository URLs plus the scan mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub repositories: Vec<String>,
    #[serde(rename = "scanType")]
    pub scan_type: ScanType,
}
