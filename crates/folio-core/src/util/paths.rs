//! Root-confined path handling.
//!
//! Every caller-supplied path goes through [`CorpusPath::parse`] before the
//! filesystem is touched. Parsing rejects traversal segments (`..`), absolute
//! paths and drive prefixes outright; nothing is clamped. The parsed path is
//! then resolved with [`resolve_within_root`], which follows symlinks and
//! rejects anything whose real location lies outside the root.
//!
//! # Example
//!
//! ```rust
//! use folio_core::util::paths::CorpusPath;
//!
//! let path = CorpusPath::parse("./guides//intro.md").unwrap();
//! assert_eq!(path.to_string(), "guides/intro.md");
//! assert_eq!(path.name(), "intro.md");
//!
//! assert!(CorpusPath::parse("../etc/passwd").is_err());
//! assert!(CorpusPath::parse("/etc/passwd").is_err());
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::entry::ROOT_SENTINEL;
use crate::{Error, Result};

/// A normalized, slash-separated path relative to the corpus root.
///
/// The root itself has no segments and displays as `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorpusPath {
    segments: Vec<String>,
}

impl CorpusPath {
    /// The corpus root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a caller-supplied path.
    ///
    /// Empty segments and `.` are dropped. Both `/` and `\` separate segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for `..` segments, absolute paths, drive
    /// prefixes and embedded NUL bytes.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with('/') || raw.starts_with('\\') || raw.contains('\0') {
            return Err(Error::not_found(raw));
        }

        let mut segments = Vec::new();
        for (i, segment) in raw.split(['/', '\\']).enumerate() {
            match segment {
                "" | "." => continue,
                ".." => return Err(Error::not_found(raw)),
                s if i == 0 && is_drive_prefix(s) => return Err(Error::not_found(raw)),
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    /// Build from a path already known to be relative to the root.
    ///
    /// Returns `None` if the path contains anything other than normal
    /// components.
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_string()),
                Component::CurDir => continue,
                _ => return None,
            }
        }
        Some(Self { segments })
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, or `.` for the root.
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or(ROOT_SENTINEL)
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Parent directory (the root is its own parent).
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Append a single child name.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Returns `true` if `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &CorpusPath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Lexical location under `root`, without touching the filesystem.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for CorpusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str(ROOT_SENTINEL)
        } else {
            f.write_str(&self.segments.join("/"))
        }
    }
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Resolve `path` against a canonical `root`, following symlinks.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the location does not exist or its real
/// location is outside `root`.
pub fn resolve_within_root(root: &Path, path: &CorpusPath) -> Result<PathBuf> {
    let candidate = path.to_path(root);
    let resolved = candidate
        .canonicalize()
        .map_err(|_| Error::not_found(path.to_string()))?;

    if !resolved.starts_with(root) {
        log::debug!(
            "Rejecting '{path}': resolves to {} outside the corpus root",
            resolved.display()
        );
        return Err(Error::not_found(path.to_string()));
    }

    Ok(resolved)
}

// ============================================================================
// Tests
// ============================================================================
