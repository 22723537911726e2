//! Command-line argument definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_fts::QueryMode;

use crate::config::Overrides;

/// Folio - browse, render and search a markdown corpus
#[derive(Parser, Debug)]
#[command(name = "folio", version)]
#[command(about = "Browse, render and search a directory of markdown documents", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Corpus root directory
    #[arg(short, long, global = true, env = "FOLIO_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Overrides carried by global flags.
    pub fn overrides(&self) -> Overrides {
        let (host, port) = match &self.command {
            Command::Serve { host, port } => (*host, *port),
            _ => (None, None),
        };
        Overrides {
            root: self.root.clone(),
            host,
            port,
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the index and serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List a directory of the corpus
    Ls {
        /// Directory relative to the root
        #[arg(default_value = ".")]
        path: String,
    },

    /// Show one document
    Show {
        /// Document path relative to the root
        path: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Raw)]
        format: ShowFormat,
    },

    /// Search the corpus
    Search {
        /// Free-text query
        query: String,

        /// Require every term to match
        #[arg(long)]
        all: bool,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Build the index once and report statistics
    Index,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Query mode requested by `search --all`.
    pub fn query_mode(all: bool) -> Option<QueryMode> {
        all.then_some(QueryMode::And)
    }
}

/// How `show` prints a document.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowFormat {
    /// Body with frontmatter removed
    Raw,
    /// Rendered HTML
    Html,
    /// Plain text, markup stripped
    Text,
    /// Full parsed document as JSON
    Json,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Get a value by dotted key (e.g. `server.port`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Print the effective configuration as TOML
    Show,
    /// Write a default config file
    Init {
        /// Target file; defaults to the platform config path
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
