// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Klarwerk — document image enhancement.
//
// Entry point. Initialises logging and configuration, then runs one of the
// command-line modes: folder enhancement, full variant catalog, or listing.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use klarwerk_app::services::data_dir;
use klarwerk_app::services::enhancer_service::{self, EnhancerService};
use klarwerk_app::services::folder::enhance_folder;
use klarwerk_core::EnhanceConfig;
use klarwerk_core::error::Result;
use klarwerk_core::human_errors::{humanize_cleanup_warning, humanize_error};
use klarwerk_core::types::{Primary, VariantToken};

#[derive(Debug, Parser)]
#[command(name = "klarwerk", version, about = "Enhance document photos and scans")]
struct Cli {
    /// Configuration file (defaults to config.json in the data directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where uploads and variants are stored.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Enhance every image in a folder with one method.
    Enhance {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Variant token, e.g. `soft_contrast_2x`. Unknown names fall back
        /// to `smooth_quality`.
        #[arg(long, default_value = "smooth_quality")]
        method: String,
    },
    /// Build all twelve variants of one file and write them to a folder.
    Variants {
        file: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Run the attempts on all cores.
        #[arg(long)]
        parallel: bool,
    },
    /// List the available variant tokens.
    Methods,
    /// Delete every stored upload and variant.
    Cleanup,
    /// Print the effective configuration, optionally saving it.
    Config {
        /// Write it to config.json in the data directory.
        #[arg(long)]
        save: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "klarwerk failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli, data_dir: &Path) -> Result<EnhanceConfig> {
    match &cli.config {
        Some(path) => enhancer_service::load_config_from(path),
        None => Ok(enhancer_service::load_config(data_dir).unwrap_or_default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = data_dir::resolve(cli.data_dir.as_deref());
    let config = load_config(&cli, &data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "Klarwerk starting");

    match cli.command {
        Command::Enhance { input, output, method } => {
            let token = match method.parse::<VariantToken>() {
                Ok(token) => token,
                Err(_) => {
                    let fallback = VariantToken::parse_lenient(&method);
                    tracing::warn!(requested = %method, using = %fallback, "unknown method");
                    fallback
                }
            };
            let report = enhance_folder(&input, &output, token, config.jpeg_quality)?;
            println!("Processed {}/{} images", report.processed(), report.total);
            for (path, err) in &report.failures {
                println!(
                    "  skipped {}: {}",
                    path.display(),
                    humanize_error(err).message
                );
            }
        }
        Command::Variants { file, output, parallel } => {
            let config = EnhanceConfig {
                parallel: parallel || config.parallel,
                ..config
            };
            let service = match EnhancerService::init(config, &data_dir) {
                Ok(service) => service,
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        "persistent storage failed, using in-memory fallback"
                    );
                    EnhancerService::fallback()?
                }
            };
            write_variants(&service, &file, &output)?;
        }
        Command::Methods => {
            for token in VariantToken::ALL {
                let scale = match token.scale.factor() {
                    1 => String::new(),
                    f => format!(", upscaled {f}x"),
                };
                println!(
                    "{:<26} {}{scale}",
                    token.to_string(),
                    token.method.description()
                );
            }
        }
        Command::Cleanup => {
            let report = EnhancerService::init(config, &data_dir)?.cleanup()?;
            println!("Removed {} stored files", report.artifacts_removed);
            for warning in &report.warnings {
                let human = humanize_cleanup_warning(warning);
                println!("  {}: {}", human.message, human.suggestion);
            }
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                enhancer_service::persist_config(&data_dir, &config)?;
                let saved = data_dir.join(enhancer_service::CONFIG_FILE);
                println!("Saved to {}", saved.display());
            }
        }
    }
    Ok(())
}

fn write_variants(service: &EnhancerService, file: &Path, output: &Path) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let (id, report) = service.submit(filename, &bytes)?;

    std::fs::create_dir_all(output)?;
    for variant in report.catalog().iter() {
        let name = service.download_name(id, Some(variant.token))?;
        std::fs::write(output.join(&name), service.variant_bytes(id, variant.token)?)?;
        println!(
            "{:<26} {:>5}x{:<5} {:>9} bytes  {name}",
            variant.token.to_string(),
            variant.width,
            variant.height,
            variant.byte_size
        );
    }
    for (token, err) in report.failures() {
        println!(
            "{:<26} failed: {}",
            token.to_string(),
            humanize_error(err).message
        );
    }

    println!(
        "{}/{} variants succeeded",
        report.success_count(),
        report.total_attempted()
    );
    match report.default_primary() {
        Primary::Variant(token) => {
            let name = service.download_name(id, None)?;
            std::fs::write(output.join(&name), service.primary_bytes(id)?)?;
            println!("Primary: {token} ({name})");
        }
        Primary::Original => println!("Primary: original (no variant succeeded)"),
    }
    Ok(())
}
