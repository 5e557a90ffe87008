//! `embedded-deps` — inventory the third-party packages embedded in a build
//! and record their licensing.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config and apply CLI overrides ([`config::load_config`]).
//! 3. Resolve installed packages ([`resolver`]).
//! 4. Optionally fill missing declared licenses from the npm registry (`--online`, [`registry`]).
//! 5. Locate license files, extract copyright lines, classify copyleft exposure
//!    and build the manifest ([`pipeline::run`]).
//! 6. Write `embedded-dependencies.json` (and `THIRD-PARTY-NOTICES.html` when
//!    requested), surface warnings, render the report ([`report`]).

mod cli;
mod config;
mod license;
mod manifest;
mod models;
mod pipeline;
mod registry;
mod report;
mod resolver;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;
use pipeline::FsReader;
use report::notices::NOTICES_FILE_NAME;
use resolver::node::NodeResolver;
use resolver::Resolver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?.with_overrides(cli.overrides());

    let mut descriptors = NodeResolver::new(config.include_dev).resolve(&path)?;
    if !cli.quiet {
        eprintln!(
            "  {} {} installed packages",
            "→".cyan(),
            descriptors.len()
        );
    }

    if cli.online {
        registry::enrich_declared_licenses(&mut descriptors, cli.quiet).await?;
    }

    let pb = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new(descriptors.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let output = pipeline::run(&descriptors, &FsReader, &config, pb.as_ref()).await?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let out_dir = cli.out_dir.clone().unwrap_or_else(|| path.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let manifest_path = out_dir.join(&config.output_file_name);
    write_output(&manifest_path, &output.manifest_json)?;

    let mut written: Vec<PathBuf> = vec![manifest_path];
    if let Some(html) = &output.notices {
        let notices_path = out_dir.join(NOTICES_FILE_NAME);
        write_output(&notices_path, html)?;
        written.push(notices_path);
    }

    for diagnostic in &output.diagnostics {
        eprintln!("{}: {}", diagnostic.severity.to_string().yellow().bold(), diagnostic.message);
    }

    match cli.report {
        ReportFormat::Terminal => {
            let written: Vec<&Path> = written.iter().map(PathBuf::as_path).collect();
            report::terminal::render(&output.manifest, &path, &written, cli.verbose, cli.quiet);
        }
        ReportFormat::Json => {
            print!("{}", output.manifest_json);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}
