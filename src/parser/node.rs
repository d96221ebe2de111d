use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use super::{strip_version, ManifestParser, ManifestReport};
use crate::models::{Dependency, DependencyType, RuntimeInfo, VersionStatus};

/// Parser for `package.json`.
///
/// Merges `dependencies` and `devDependencies`. Runtime dependencies are
/// emitted first so that on a name collision the runtime entry survives the
/// first-wins dedup downstream. An `engines.node` field yields a "Node.js"
/// runtime record.
pub struct NodeParser;

impl NodeParser {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for NodeParser {
    fn filename(&self) -> &'static str {
        "package.json"
    }

    fn parse(&self, path: &Path) -> Result<ManifestReport> {
        let content = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&content)?;
        let mut report = ManifestReport::default();

        if let Some(node) = json.pointer("/engines/node").and_then(|v| v.as_str()) {
            report.runtime = Some(RuntimeInfo {
                name: "Node.js".to_string(),
                version: strip_version(node),
                status: VersionStatus::Ok,
            });
        }

        for section in ["dependencies", "devDependencies"] {
            if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
                for (name, version) in pkgs {
                    report.dependencies.push(Dependency {
                        name: name.clone(),
                        current_version: strip_version(version.as_str().unwrap_or("")),
                        kind: DependencyType::Npm,
                        source_path: Some(path.to_path_buf()),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(json: &str) -> ManifestReport {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", json).unwrap();
        NodeParser::new().parse(f.path()).unwrap()
    }

    #[test]
    fn test_single_dependency_round_trip() {
        let report = parse(r#"{"dependencies":{"a":"^1.2.3"}}"#);
        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].name, "a");
        assert_eq!(report.dependencies[0].current_version, "1.2.3");
        assert_eq!(report.dependencies[0].kind, DependencyType::Npm);
    }

    #[test]
    fn test_merges_dev_dependencies() {
        let report = parse(
            r#"{
  "dependencies": { "express": "^4.18.2" },
  "devDependencies": { "jest": "~29.0.0" }
}"#,
        );
        assert_eq!(report.dependencies.len(), 2);
        assert_eq!(report.dependencies[0].name, "express");
        assert_eq!(report.dependencies[1].name, "jest");
        assert_eq!(report.dependencies[1].current_version, "29.0.0");
    }

    #[test]
    fn test_runtime_dependencies_emitted_before_dev() {
        // Same name in both sections: the runtime entry comes first and
        // therefore wins the scanner's first-wins dedup.
        let report = parse(
            r#"{
  "dependencies": { "typescript": "5.4.0" },
  "devDependencies": { "typescript": "5.0.0" }
}"#,
        );
        assert_eq!(report.dependencies[0].current_version, "5.4.0");
    }

    #[test]
    fn test_engines_node_runtime() {
        let report = parse(r#"{"engines":{"node":">=18.0.0"}}"#);
        let runtime = report.runtime.unwrap();
        assert_eq!(runtime.name, "Node.js");
        assert_eq!(runtime.version, "18.0.0");
        assert_eq!(runtime.status, VersionStatus::Ok);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(NodeParser::new().parse(f.path()).is_err());
    }
}
