//! # svelte-sentinel CLI Entry Point
//!
//! Thin orchestration around the library: collects `.svelte` files,
//! analyzes each one, and renders the scan report in the requested
//! format. Exit code conventions live here, not in the core.

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use svelte_sentinel::{analyze, Cli, Report};

/// ASCII art banner displayed at startup.
const BANNER: &str = r#"
  ____  _____ _   _ _____ ___ _   _ _____ _
 / ___|| ____| \ | |_   _|_ _| \ | | ____| |
 \___ \|  _| |  \| | | |  | ||  \| |  _| | |
  ___) | |___| |\  | | |  | || |\  | |___| |___
 |____/|_____|_| \_| |_| |___|_| \_|_____|_____|

        svelte-sentinel: Svelte Component Security Scanner
"#;

/// Application entry point.
///
/// Initializes logging, parses command-line arguments, and dispatches to
/// the appropriate command handler. The banner is suppressed for machine
/// formats so their output stays parseable.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        svelte_sentinel::cli::Commands::Scan {
            path,
            recursive,
            format,
            ignore,
            runes,
        } => {
            if format == "terminal" {
                println!("{}", BANNER.cyan().bold());
            }
            run_scan(path, recursive, &format, &ignore, runes)?;
        }
        svelte_sentinel::cli::Commands::Version => {
            println!(
                "{} {}",
                "svelte-sentinel version:".green(),
                env!("CARGO_PKG_VERSION").yellow()
            );
        }
    }

    Ok(())
}

/// Executes the scan operation.
///
/// Collects component files, analyzes each one, renders the report in the
/// requested format, and exits non-zero when warnings or parse failures
/// were found.
fn run_scan(
    path: PathBuf,
    recursive: bool,
    format: &str,
    ignore_functions: &[String],
    runes: bool,
) -> Result<()> {
    if format == "terminal" {
        println!(
            "{} {}",
            "[*] Scanning:".green().bold(),
            path.display().to_string().yellow()
        );
    }

    let report = perform_scan(&path, recursive, ignore_functions, runes)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "github" => {
            // GitHub Actions annotations:
            // ::warning file={name},line={line},col={col}::{message}
            for file in &report.reports {
                for warning in &file.warnings {
                    println!(
                        "::warning file={},line={},col={}::{}",
                        warning.filename, warning.start.line, warning.start.column, warning.message
                    );
                }
                if let Some(error) = &file.error {
                    println!("::error file={}::{}", file.filename, error);
                }
            }
        }
        _ => {
            report.print_terminal();
            println!("\n{}", "=".repeat(60).cyan());
            report.print_summary();
        }
    }

    if report.has_issues() {
        std::process::exit(1);
    }

    Ok(())
}

/// Analyzes every collected file and assembles the scan report.
fn perform_scan(
    path: &Path,
    recursive: bool,
    ignore_functions: &[String],
    runes: bool,
) -> Result<Report> {
    use indicatif::{ProgressBar, ProgressStyle};

    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        collect_svelte_files(path, recursive)
    };

    if files.is_empty() {
        return Ok(Report::new(Vec::new(), path));
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut reports = Vec::new();

    for file_path in &files {
        pb.set_message(format!(
            "Analyzing {}",
            file_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        match std::fs::read_to_string(file_path) {
            Ok(source) => {
                let filename = file_path.display().to_string();
                reports.push(analyze(&source, &filename, ignore_functions, runes));
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", file_path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(Report::new(reports, path))
}

/// Collects `.svelte` files from a directory, skipping `node_modules`.
fn collect_svelte_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    use walkdir::WalkDir;

    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().extension().map_or(false, |ext| ext == "svelte")
                && !e.path().to_string_lossy().contains("node_modules")
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}
