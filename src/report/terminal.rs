use anyhow::Result;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::models::ScanResult;

/// Render a colored terminal report, one section per repository.
pub fn render(results: &[ScanResult], verbose: bool, quiet: bool) -> Result<()> {
    let total = results.len();
    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = total - succeeded;

    if quiet {
        println!(
            "Repositories: {}  Ok: {}  Failed: {}",
            total,
            succeeded.to_string().green(),
            failed.to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "repo-scanr".bold(), env!("CARGO_PKG_VERSION"));
    println!(
        " Repositories scanned: {}   {} ok   {} failed\n",
        total,
        succeeded.to_string().green(),
        failed.to_string().red(),
    );

    for result in results {
        let marker = if result.success {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(" {} {}  ({})", marker, result.repository_url.bold(), result.timestamp);

        if let Some(error) = &result.error {
            println!("   {} {}\n", "error:".red().bold(), error);
            continue;
        }

        for runtime in &result.runtimes {
            println!("   runtime: {} {}", runtime.name, runtime.version);
        }
        for docker in &result.docker {
            println!("   base image: {}:{}", docker.base_image, docker.version);
        }
        println!("   {} dependencies", result.dependencies.len());

        if !result.dependencies.is_empty() {
            render_table(result, verbose);
        }
        println!();
    }

    Ok(())
}

fn render_table(result: &ScanResult, verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Version").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
    ];
    if verbose {
        header.push(Cell::new("Manifest").add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    for dep in &result.dependencies {
        let mut row = vec![
            Cell::new(&dep.name),
            Cell::new(&dep.current_version),
            Cell::new(dep.kind.to_string()),
        ];
        if verbose {
            let manifest = dep
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            row.push(Cell::new(manifest));
        }
        table.add_row(row);
    }

    println!("{}", table);
}
