// kpathsea-cli/src/main.rs
mod models;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use kpathsea_core::{FileFormat, Kpathsea, LookupError};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::cli::Cli;

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    debug!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}).",
        default_level
    );
    Ok(())
}

/// Runs one lookup with the requested call shape.
async fn lookup(
    kpse: &Kpathsea,
    file: &str,
    format: FileFormat,
    blocking: bool,
) -> Result<PathBuf, LookupError> {
    if blocking {
        kpse.find_file_blocking(file, format)
    } else {
        kpse.find_file(file, format).await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{} {:#}", "Error:".red(), e);
        return ExitCode::FAILURE;
    }

    let cwd = match env::current_dir().context("Failed to get current directory") {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let config = match settings::load_settings(&cli, &cwd, |key| env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            eprintln!("{} Could not load configuration: {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let kpse = Kpathsea::from_config(&config);
    let format = config.format();
    info!(
        program = %kpse.binding().program().display(),
        format = %format,
        count = cli.files.len(),
        "Starting lookups"
    );

    let mut failures = 0usize;
    for file in &cli.files {
        match lookup(&kpse, file, format, cli.blocking).await {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                failures += 1;
                debug!(error = ?e, "Lookup failed");
                eprintln!("{} {}", "Error:".red(), e);
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        info!(failures, "Some lookups failed");
        ExitCode::FAILURE
    }
}
