use std::path::Path;

use anyhow::Result;
use regex::Regex;

use super::{ManifestParser, ManifestReport};
use crate::models::{Dependency, DependencyType};

/// Parser for `requirements.txt`.
///
/// One requirement per line: a name, an optional comparison operator, and an
/// optional version. Blank lines, `#` comments and pip directives (`-r`,
/// `-e`, ...) are skipped. A requirement without a version becomes the
/// literal `latest`.
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for PythonParser {
    fn filename(&self) -> &'static str {
        "requirements.txt"
    }

    fn parse(&self, path: &Path) -> Result<ManifestReport> {
        let content = std::fs::read_to_string(path)?;
        let re = Regex::new(r"^([^=<>~!\s]+)\s*(?:==|>=|<=|~=|!=)?\s*(\S+)?")?;
        let mut report = ManifestReport::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }

            if let Some(caps) = re.captures(line) {
                let version = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "latest".to_string());
                report.dependencies.push(Dependency {
                    name: caps[1].to_string(),
                    current_version: version,
                    kind: DependencyType::Pip,
                    source_path: Some(path.to_path_buf()),
                });
            }
        }

        Ok(report)
    }
}
