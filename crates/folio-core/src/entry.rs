//! Filesystem node value types.
//!
//! [`DocumentEntry`] and [`DirectoryListing`] are built fresh from live
//! filesystem state on every call and are never cached. Field names are part
//! of the stable contract consumed by presentation clients.

use serde::{Deserialize, Serialize};

/// Path used to denote the corpus root.
pub const ROOT_SENTINEL: &str = ".";

/// One filesystem node under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Base name.
    pub name: String,
    /// Slash-separated path relative to the corpus root.
    pub path: String,
    /// Whether this node is a directory.
    pub is_directory: bool,
    /// Byte length (0 for directories).
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub modified_time: u64,
}

impl DocumentEntry {
    /// Returns `true` for non-directory entries.
    pub fn is_document(&self) -> bool {
        !self.is_directory
    }
}

/// Result of listing a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Base name of the listed directory (`.` for the root).
    pub name: String,
    /// Normalized path of the listed directory.
    pub path: String,
    /// Directories first, then documents.
    #[serde(rename = "files")]
    pub entries: Vec<DocumentEntry>,
}

impl DirectoryListing {
    /// Document entries only.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter().filter(|e| e.is_document())
    }

    /// Subdirectory entries only.
    pub fn subdirectories(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter().filter(|e| e.is_directory)
    }
}
