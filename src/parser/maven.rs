use std::path::Path;

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ManifestParser, ManifestReport};
use crate::models::{Dependency, DependencyType, RuntimeInfo, VersionStatus};

/// Parser for Maven `pom.xml`, using the quick-xml event API.
///
/// Emits one dependency per `<project><dependencies><dependency>` entry,
/// named `groupId:artifactId`; a missing `<version>` becomes `latest`.
/// `<properties><java.version>` yields a "Java" runtime record.
/// `<dependencyManagement>` blocks are ignored (they pin versions, they do
/// not declare dependencies).
pub struct MavenParser;

impl MavenParser {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for MavenParser {
    fn filename(&self) -> &'static str {
        "pom.xml"
    }

    fn parse(&self, path: &Path) -> Result<ManifestReport> {
        let content = std::fs::read_to_string(path)?;
        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut report = ManifestReport::default();
        let mut buf = Vec::new();

        let mut depth: u32 = 0;
        let mut in_dependencies = false;
        let mut in_properties = false;
        let mut in_dependency = false;
        let mut dependency_depth: u32 = 0;
        let mut current_tag = String::new();

        let mut group_id = String::new();
        let mut artifact_id = String::new();
        let mut version = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    let name =
                        String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                    current_tag = name.clone();

                    // Project-level sections live at depth 2 (project = 1);
                    // this keeps dependencyManagement/dependencies out.
                    match name.as_str() {
                        "dependencies" if depth == 2 => in_dependencies = true,
                        "properties" if depth == 2 => in_properties = true,
                        "dependency" if in_dependencies => {
                            in_dependency = true;
                            dependency_depth = depth;
                            group_id.clear();
                            artifact_id.clear();
                            version.clear();
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name =
                        String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();

                    match name.as_str() {
                        "dependency" if in_dependency => {
                            if !artifact_id.is_empty() {
                                let dep_version = if version.is_empty() {
                                    "latest".to_string()
                                } else {
                                    version.clone()
                                };
                                let dep_name = if group_id.is_empty() {
                                    artifact_id.clone()
                                } else {
                                    format!("{}:{}", group_id, artifact_id)
                                };
                                report.dependencies.push(Dependency {
                                    name: dep_name,
                                    current_version: dep_version,
                                    kind: DependencyType::Maven,
                                    source_path: Some(path.to_path_buf()),
                                });
                            }
                            in_dependency = false;
                        }
                        "dependencies" if depth == 2 => in_dependencies = false,
                        "properties" if depth == 2 => in_properties = false,
                        _ => {}
                    }

                    depth = depth.saturating_sub(1);
                    current_tag.clear();
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().unwrap_or_default();
                    // Only direct children of <dependency> name the artifact;
                    // an <exclusions> block nests its own groupId/artifactId.
                    if in_dependency && depth == dependency_depth + 1 {
                        match current_tag.as_str() {
                            "groupId" => group_id = text.to_string(),
                            "artifactId" => artifact_id = text.to_string(),
                            "version" => version = text.to_string(),
                            _ => {}
                        }
                    } else if in_properties && current_tag == "java.version" {
                        report.runtime = Some(RuntimeInfo {
                            name: "Java".to_string(),
                            version: text.to_string(),
                            status: VersionStatus::Ok,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(report)
    }
}
