use std::path::Path;

use anyhow::{anyhow, bail, Result};

use crate::models::{DockerInfo, VersionStatus};

/// Parse a container build file: the first `FROM` line names the base
/// image, an untagged reference defaults to `latest`.
///
/// Unlike the manifest parsers, a file with no `FROM` instruction is an
/// error; the scanner converts it into a scan-level failure for the
/// repository instead of swallowing it.
pub fn parse_dockerfile(path: &Path) -> Result<DockerInfo> {
    let content = std::fs::read_to_string(path)?;

    let from_line = content
        .lines()
        .map(str::trim)
        .find(|line| {
            line.get(..4)
                .is_some_and(|keyword| keyword.eq_ignore_ascii_case("FROM"))
        });

    let Some(from_line) = from_line else {
        bail!("no FROM instruction found in {}", path.display());
    };

    let image_ref = from_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("FROM instruction without an image reference"))?;

    let (image, tag) = match image_ref.split_once(':') {
        Some((image, tag)) if !tag.is_empty() => (image, tag),
        Some((image, _)) => (image, "latest"),
        None => (image_ref, "latest"),
    };

    Ok(DockerInfo {
        base_image: image.to_string(),
        version: tag.to_string(),
        status: VersionStatus::Ok,
    })
}
