//! `repo-scanr`: clone repositories and scan their dependency manifests.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load configuration ([`config::load_config`]).
//! 3. Either scan an already checked-out tree (`--path`, [`scanner`]) or
//!    submit the URL batch to the scan service ([`service`]) and poll it to
//!    completion with a progress bar.
//! 4. Render the requested report ([`report`]).
//! 5. Exit `0` (all repositories scanned) or `1` (at least one failure).

mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod orchestrator;
mod parser;
mod report;
mod scanner;
mod service;
mod walker;
mod workspace;

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;
use models::{ScanRequest, ScanResult, ScanType};
use scanner::DependencyScanner;
use service::ScanService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let results = if let Some(path) = &cli.path {
        // Local tree: no clone, no workspace, just the scanner.
        let path = path.canonicalize().unwrap_or_else(|_| path.clone());
        let url = path.display().to_string();
        let scanner = DependencyScanner::new(config.scan.skip_dirs.clone());
        vec![match scanner.scan(&path, cli.scan_type) {
            Ok(scan_report) => ScanResult::completed(&url, cli.scan_type, scan_report),
            Err(err) => ScanResult::failed(&url, cli.scan_type, err.to_string()),
        }]
    } else {
        if cli.repositories.is_empty() {
            bail!("no repository URLs given (pass URLs or --path DIR)");
        }
        let service = ScanService::new(&config);
        if cli.quiet {
            // No progress display wanted: run the batch inline.
            service.scan_all(&cli.repositories, cli.scan_type).await?
        } else {
            submit_and_poll(&service, &cli.repositories, cli.scan_type).await?
        }
    };

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&results, cli.verbose, cli.quiet)?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }

    if results.iter().any(|r| !r.success) {
        std::process::exit(1);
    }

    Ok(())
}

/// Submit the batch to the scan service, then poll its status while driving
/// a progress bar until every repository has been attempted.
async fn submit_and_poll(
    service: &ScanService,
    repositories: &[String],
    scan_type: ScanType,
) -> Result<Vec<ScanResult>> {
    let scan_id = service
        .submit(ScanRequest {
            repositories: repositories.to_vec(),
            scan_type,
        })
        .await?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    loop {
        let status = service
            .status(&scan_id)
            .await
            .ok_or_else(|| anyhow!("scan job {scan_id} expired before completion"))?;

        pb.set_position(u64::from(status.progress));
        pb.set_message(format!(
            "{}/{} repositories",
            status.results.len(),
            repositories.len()
        ));

        if let Some(message) = status.error {
            pb.abandon_with_message("failed");
            bail!("scan {scan_id} failed: {message}");
        }
        if status.progress == 100 {
            pb.finish_with_message("Done");
            return Ok(status.results);
        }

        tokio::time::sleep(Duration::from_millis(150)).await;
    }
}
