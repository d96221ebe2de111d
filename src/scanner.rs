use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::error::ScanError;
use crate::models::{Dependency, ScanReport, ScanType};
use crate::parser::{self, ManifestParser};
use crate::walker;

/// Scans one checked-out repository tree: walks it once per known manifest
/// filename, parses every match, and deduplicates the combined result by
/// `(type, name)`, first occurrence winning.
pub struct DependencyScanner {
    parsers: Vec<Box<dyn ManifestParser>>,
    skip_dirs: Vec<String>,
}

impl DependencyScanner {
    pub fn new(skip_dirs: Vec<String>) -> Self {
        Self {
            parsers: vec![
                Box::new(parser::node::NodeParser::new()),
                Box::new(parser::python::PythonParser::new()),
                Box::new(parser::maven::MavenParser::new()),
            ],
            skip_dirs,
        }
    }

    /// Scan `repo_path`. A malformed package/requirements/POM manifest is
    /// logged and skipped; a malformed Dockerfile fails the scan.
    pub fn scan(&self, repo_path: &Path, scan_type: ScanType) -> Result<ScanReport, ScanError> {
        // Both scan types perform a full walk; "incremental" is reserved.
        let _ = scan_type;

        let mut report = ScanReport::default();

        for manifest_parser in &self.parsers {
            for file in walker::find_files(repo_path, manifest_parser.filename(), &self.skip_dirs)
            {
                match manifest_parser.parse(&file) {
                    Ok(parsed) => {
                        report.dependencies.extend(parsed.dependencies);
                        if let Some(runtime) = parsed.runtime {
                            report.runtimes.push(runtime);
                        }
                    }
                    Err(err) => {
                        warn!(file = %file.display(), %err, "failed to parse manifest, skipping");
                    }
                }
            }
        }

        for file in walker::find_files(repo_path, "Dockerfile", &self.skip_dirs) {
            let info = parser::docker::parse_dockerfile(&file).map_err(|err| {
                ScanError::Parse {
                    path: file.clone(),
                    message: err.to_string(),
                }
            })?;
            report.docker.push(info);
        }

        report.dependencies = dedup(report.dependencies);
        Ok(report)
    }
}

fn dedup(dependencies: Vec<Dependency>) -> Vec<Dependency> {
    let mut seen = HashSet::new();
    dependencies
        .into_iter()
        .filter(|dep| seen.insert(dep.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyType;
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> DependencyScanner {
        DependencyScanner::new(vec!["node_modules".to_string()])
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"express":"^4.18.2"},"engines":{"node":">=18"}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/requirements.txt"), "flask==2.3.0\nbar\n").unwrap();
        dir
    }

    #[test]
    fn test_collects_across_manifest_formats() {
        let dir = fixture();
        let report = scanner().scan(dir.path(), ScanType::Full).unwrap();

        assert_eq!(report.dependencies.len(), 3);
        assert!(report
            .dependencies
            .iter()
            .any(|d| d.name == "express" && d.kind == DependencyType::Npm));
        assert!(report
            .dependencies
            .iter()
            .any(|d| d.name == "flask" && d.kind == DependencyType::Pip));
        assert_eq!(report.runtimes.len(), 1);
        assert_eq!(report.runtimes[0].name, "Node.js");
    }

    #[test]
    fn test_dedup_is_first_wins_per_type_and_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"lodash":"^4.17.21"}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(
            dir.path().join("sub/package.json"),
            r#"{"dependencies":{"lodash":"^3.0.0"}}"#,
        )
        .unwrap();
        // Same name in a different ecosystem is not a duplicate
        fs::write(dir.path().join("requirements.txt"), "lodash==1.0\n").unwrap();

        let report = scanner().scan(dir.path(), ScanType::Full).unwrap();
        let lodash_npm: Vec<_> = report
            .dependencies
            .iter()
            .filter(|d| d.name == "lodash" && d.kind == DependencyType::Npm)
            .collect();
        assert_eq!(lodash_npm.len(), 1);
        assert!(report
            .dependencies
            .iter()
            .any(|d| d.name == "lodash" && d.kind == DependencyType::Pip));

        let mut keys = HashSet::new();
        assert!(report.dependencies.iter().all(|d| keys.insert(d.dedup_key())));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = fixture();
        let scanner = scanner();

        let sorted = |mut report: ScanReport| {
            report
                .dependencies
                .sort_by(|a, b| a.name.cmp(&b.name));
            report
                .dependencies
                .into_iter()
                .map(|d| (d.kind, d.name, d.current_version))
                .collect::<Vec<_>>()
        };

        let first = sorted(scanner.scan(dir.path(), ScanType::Full).unwrap());
        let second = sorted(scanner.scan(dir.path(), ScanType::Full).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests==2.28.1\n").unwrap();

        let report = scanner().scan(dir.path(), ScanType::Full).unwrap();
        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].name, "requests");
    }

    #[test]
    fn test_dockerfile_parsed_and_failure_escalates() {
        let dir = fixture();
        fs::write(dir.path().join("Dockerfile"), "FROM python:3.11-slim\n").unwrap();

        let report = scanner().scan(dir.path(), ScanType::Full).unwrap();
        assert_eq!(report.docker.len(), 1);
        assert_eq!(report.docker[0].base_image, "python");

        fs::write(dir.path().join("Dockerfile"), "RUN echo no-from\n").unwrap();
        let err = scanner().scan(dir.path(), ScanType::Full).unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
    }

    #[test]
    fn test_incremental_behaves_like_full() {
        let dir = fixture();
        let scanner = scanner();
        let full = scanner.scan(dir.path(), ScanType::Full).unwrap();
        let incremental = scanner.scan(dir.path(), ScanType::Incremental).unwrap();
        assert_eq!(full.dependencies.len(), incremental.dependencies.len());
    }
}
