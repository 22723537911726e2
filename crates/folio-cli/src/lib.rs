//! # folio-cli
//!
//! Command-line front end for Folio:
//! - `serve`: build the index and expose the HTTP API
//! - `ls`, `show`, `search`, `index`: one-shot operations on a corpus
//! - `config`: inspect and initialize the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Args, Command};
pub use config::FolioConfig;
