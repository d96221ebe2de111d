use std::path::Path;

use anyhow::Result;

use crate::models::{Dependency, RuntimeInfo};

pub mod docker;
pub mod maven;
pub mod node;
pub mod python;

/// Output of one manifest parse: the dependencies it declares plus an
/// optional detected runtime requirement.
#[derive(Debug, Default)]
pub struct ManifestReport {
    pub dependencies: Vec<Dependency>,
    pub runtime: Option<RuntimeInfo>,
}

/// A parser for one manifest format. Parse failures are logged and
/// swallowed by the scanner; they never abort a repository scan.
///
/// The container build file parser ([`docker::parse_dockerfile`]) is not
/// part of this set: its failure contract is different (a malformed
/// Dockerfile fails the whole repository scan).
pub trait ManifestParser: Send + Sync {
    /// Exact file name this parser handles, e.g. `package.json`.
    fn filename(&self) -> &'static str;

    fn parse(&self, path: &Path) -> Result<ManifestReport>;
}

/// Reduce a version requirement to its numeric core: `^1.2.3` → `1.2.3`,
/// `>=18.0.0` → `18.0.0`.
pub(crate) fn strip_version(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
