//! Folio Core: shared types, errors, and filesystem utilities.
//!
//! This crate provides the foundational pieces used across all Folio crates.
//! It has no internal Folio dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`entry`]: `DocumentEntry` and `DirectoryListing` value types
//! - [`service`]: Index lifecycle state and observation handle
//! - [`util`]: Root-confined path resolution and tree walking

pub mod entry;
pub mod error;
pub mod service;
pub mod util;

// Re-export key types at crate root for convenience
pub use entry::{DirectoryListing, DocumentEntry, ROOT_SENTINEL};
pub use error::{Error, Result};
pub use service::{IndexHandle, IndexState};
pub use util::paths::{CorpusPath, resolve_within_root};
pub use util::walker::{DocumentWalk, TreeWalker, WalkOptions, WalkedDocument};
