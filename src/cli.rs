use std::path::PathBuf;

use clap::Parser;

use crate::models::ScanType;

#[derive(Parser, Debug)]
#[command(
    name = "repo-scanr",
    about = "Clone repositories and scan their dependency manifests",
    version
)]
pub struct Cli {
    /// Repository URLs to clone and scan
    #[arg(value_name = "URL")]
    pub repositories: Vec<String>,

    /// Scan an already checked-out tree instead of cloning
    #[arg(long, value_name = "DIR", conflicts_with = "repositories")]
    pub path: Option<PathBuf>,

    /// Scan mode; "incremental" is reserved and currently behaves like "full"
    #[arg(long = "scan-type", default_value = "full", value_name = "TYPE")]
    pub scan_type: ScanType,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Config file [default: ./.repo-scanr/config.toml, fallback ~/.config/repo-scanr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show a dependency table for every repository, with manifest paths
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary lines
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
