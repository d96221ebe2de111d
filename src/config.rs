use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.repo-scanr/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Scanning behavior.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Scan-job store lifecycle.
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Directory names the walker never descends into, in addition to
    /// hidden directories.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// Version-control client binary used for cloning.
    #[serde(default = "default_git_bin")]
    pub git_bin: String,
}

#[derive(Debug, Deserialize)]
pub struct JobsConfig {
    /// Seconds a finished scan job stays retrievable before eviction.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of jobs held at once; the oldest is evicted first.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", "target", "vendor", "__pycache__"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_git_bin() -> String {
    "git".to_string()
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_jobs() -> usize {
    128
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            skip_dirs: default_skip_dirs(),
            git_bin: default_git_bin(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        JobsConfig {
            ttl_secs: default_ttl_secs(),
            max_jobs: default_max_jobs(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `./.repo-scanr/config.toml`
/// 3. `~/.config/repo-scanr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = Path::new(".repo-scanr").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("repo-scanr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
