//! Folio CLI
//!
//! Browse, render and search a directory of markdown documents.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use folio_api::ContentService;
use folio_cli::cli::{Args, Command};
use folio_cli::commands;
use folio_cli::config::FolioConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = FolioConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    config.apply_overrides(&args.overrides());

    init_logging(&config.log.level);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Serve { .. } => {
            tracing::info!(
                root = %config.content.root.display(),
                addr = %config.bind_addr(),
                "Starting folio server"
            );
            commands::cmd_serve(&config).await?
        }
        Command::Config { action } => {
            commands::cmd_config(args.config.as_deref(), &config, action, &mut out)?
        }
        Command::Ls { path } => {
            let service = ContentService::new(config.service_config())?;
            commands::cmd_ls(&service, &path, &mut out)?;
        }
        Command::Show { path, format } => {
            let service = ContentService::new(config.service_config())?;
            commands::cmd_show(&service, &path, format, &mut out)?;
        }
        Command::Search {
            query,
            all,
            limit,
            json,
        } => {
            let service = ContentService::open(config.service_config()).await?;
            let mode = Command::query_mode(all);
            commands::cmd_search(&service, &query, mode, limit, json, &mut out)?;
        }
        Command::Index => {
            let service = ContentService::new(config.service_config())?;
            commands::cmd_index(&service, &mut out).await?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Install the tracing subscriber; `log` records from the library crates are
/// bridged into it.
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
