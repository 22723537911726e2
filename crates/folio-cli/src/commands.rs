//! Subcommand handlers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_api::ContentService;
use folio_content::markdown::extract_text_content;
use folio_core::{DirectoryListing, Error, Result};
use folio_fts::{QueryMode, SearchParams, SearchResult};
use tokio_util::sync::CancellationToken;

use crate::cli::{ConfigAction, ShowFormat};
use crate::config::{FolioConfig, format_toml_value, get_nested_value};

// ============================================================================
// Serve
// ============================================================================

/// Build the index, then serve until Ctrl-C.
pub async fn cmd_serve(config: &FolioConfig) -> anyhow::Result<()> {
    let service = ContentService::open(config.service_config()).await?;
    let shutdown = CancellationToken::new();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {e}");
                return;
            }
            log::info!("Shutting down");
            shutdown.cancel();
        }
    });

    if let Some(period) = config.reindex_interval() {
        tokio::spawn(reindex_periodically(
            service.clone(),
            period,
            shutdown.clone(),
        ));
    }

    folio_api::serve(service, config.bind_addr(), shutdown).await?;
    Ok(())
}

async fn reindex_periodically(service: ContentService, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; the startup build already ran.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                match service.reindex(&shutdown.child_token()).await {
                    Ok(_) => {}
                    Err(e) if e.is_cancelled() => break,
                    Err(e) => log::error!("Scheduled reindex failed: {e}"),
                }
            }
        }
    }
    log::debug!("Periodic reindex stopped");
}

// ============================================================================
// One-shot commands
// ============================================================================

/// Print a directory listing.
pub fn cmd_ls(service: &ContentService, path: &str, out: &mut impl Write) -> Result<()> {
    let listing = service.list_directory(path)?;
    write_listing(&listing, out).map_err(io_error)
}

fn write_listing(listing: &DirectoryListing, out: &mut impl Write) -> std::io::Result<()> {
    for entry in &listing.entries {
        if entry.is_directory {
            writeln!(out, "{:>10}  {}/", "-", entry.path)?;
        } else {
            writeln!(out, "{:>10}  {}", entry.size, entry.path)?;
        }
    }
    Ok(())
}

/// Print one document.
pub fn cmd_show(
    service: &ContentService,
    path: &str,
    format: ShowFormat,
    out: &mut impl Write,
) -> Result<()> {
    let doc = service.get_document(path)?;
    let rendered = match format {
        ShowFormat::Raw => doc.raw_content,
        ShowFormat::Html => doc.html_content,
        ShowFormat::Text => extract_text_content(&doc.raw_content),
        ShowFormat::Json => {
            serde_json::to_string_pretty(&doc).map_err(|e| Error::parse(e.to_string()))?
        }
    };
    writeln!(out, "{rendered}").map_err(io_error)
}

/// Run a search against a freshly built index.
pub fn cmd_search(
    service: &ContentService,
    query: &str,
    mode: Option<QueryMode>,
    limit: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let params = SearchParams {
        query: query.to_string(),
        mode,
        limit,
    };
    let hits = service.search_with(&params);
    if json {
        let text = serde_json::to_string_pretty(&hits).map_err(|e| Error::parse(e.to_string()))?;
        writeln!(out, "{text}").map_err(io_error)
    } else {
        write_hits(&hits, out).map_err(io_error)
    }
}

fn write_hits(hits: &[SearchResult], out: &mut impl Write) -> std::io::Result<()> {
    if hits.is_empty() {
        return writeln!(out, "No matches.");
    }
    for hit in hits {
        writeln!(out, "{:.4}  {}  ({})", hit.relevance, hit.path, hit.title)?;
        writeln!(out, "        {}", hit.excerpt)?;
    }
    Ok(())
}

fn io_error(e: std::io::Error) -> Error {
    Error::io_with_path(e, Path::new("<stdout>"))
}

/// Rebuild the index and print build statistics.
pub async fn cmd_index(service: &ContentService, out: &mut impl Write) -> Result<()> {
    let stats = service.reindex(&CancellationToken::new()).await?;
    let snapshot = service.snapshot();
    writeln!(
        out,
        "generation {}: {} documents, {} skipped, {} bytes, {} distinct terms",
        stats.generation,
        stats.documents_indexed,
        stats.files_skipped,
        stats.bytes_processed,
        snapshot.term_count()
    )
    .map_err(io_error)
}

// ============================================================================
// Config
// ============================================================================

/// Handle a `config` subcommand.
pub fn cmd_config(
    explicit: Option<&str>,
    config: &FolioConfig,
    action: ConfigAction,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = FolioConfig::resolve_config_path(explicit).ok_or_else(|| {
                Error::config("Could not determine config directory for this platform")
            })?;
            writeln!(out, "{}", path.display()).map_err(io_error)?;
            if !path.exists() {
                log::warn!("{} does not exist; run `folio config init` to create it", path.display());
            }
            Ok(())
        }
        ConfigAction::Get { key } => {
            let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
            let found = get_nested_value(&value, &key)
                .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
            writeln!(out, "{}", format_toml_value(found)).map_err(io_error)
        }
        ConfigAction::Show => {
            let text = config.to_toml_string()?;
            write!(out, "{text}").map_err(io_error)
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => FolioConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            if path.exists() && !force {
                return Err(Error::config(format!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
            }
            let text = FolioConfig::default().to_toml_string()?;
            std::fs::write(&path, text).map_err(|e| Error::io_with_path(e, &path))?;
            writeln!(out, "Config file created at {}", path.display()).map_err(io_error)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
