//! Document tree walking.
//!
//! [`TreeWalker`] is bound to a canonical corpus root. It offers two views of
//! the tree:
//!
//! - [`TreeWalker::list`]: one directory level, read live on every call
//! - [`TreeWalker::documents`]: a lazy, depth-first [`DocumentWalk`] over every
//!   document below the root, restarted from scratch on each call
//!
//! Symlinks are followed. A link that points back into one of its own
//! ancestors is skipped (walkdir compares resolved file identity, not names),
//! as is any entry whose real location lies outside the root.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_core::{TreeWalker, WalkOptions};
//!
//! let walker = TreeWalker::new("./docs", WalkOptions::default())?;
//! for doc in walker.documents() {
//!     println!("{} ({} bytes)", doc.entry.path, doc.entry.size);
//! }
//! # Ok::<(), folio_core::Error>(())
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::entry::{DirectoryListing, DocumentEntry};
use crate::util::paths::{CorpusPath, resolve_within_root};
use crate::{Error, Result};

/// Which filesystem entries count as part of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Document file extensions, without dots, matched case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Include names starting with `.`.
    #[serde(default)]
    pub include_hidden: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            include_hidden: false,
        }
    }
}

impl WalkOptions {
    /// Check whether a file name has one of the document extensions.
    pub fn is_document_name(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn is_visible(&self, name: &str) -> bool {
        self.include_hidden || !name.starts_with('.')
    }
}

/// A document found by [`DocumentWalk`].
#[derive(Debug, Clone)]
pub struct WalkedDocument {
    /// Corpus-relative path.
    pub path: CorpusPath,
    /// Entry as it would appear in a listing.
    pub entry: DocumentEntry,
    /// Location on disk.
    pub location: PathBuf,
}

/// Walker bound to a canonical corpus root.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    options: WalkOptions,
}

impl TreeWalker {
    /// Create a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `root` does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>, options: WalkOptions) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| {
            Error::config(format!("Corpus root {} is not accessible: {e}", root.display()))
        })?;
        if !canonical.is_dir() {
            return Err(Error::config(format!(
                "Corpus root {} is not a directory",
                canonical.display()
            )));
        }
        Ok(Self {
            root: canonical,
            options,
        })
    }

    /// Canonical corpus root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk options in effect.
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// List a single directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `raw_path` is unsafe, hidden, missing,
    /// outside the root, or not a directory.
    pub fn list(&self, raw_path: &str) -> Result<DirectoryListing> {
        let dir = self.parse_visible(raw_path)?;
        let location = resolve_within_root(&self.root, &dir)?;
        if !location.is_dir() {
            return Err(Error::not_found(raw_path));
        }

        let mut entries = Vec::new();
        let walk = WalkDir::new(&location)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for item in walk {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in '{dir}': {e}");
                    continue;
                }
            };
            let Some(name) = item.file_name().to_str() else {
                continue;
            };
            if !self.options.is_visible(name) {
                continue;
            }
            let is_directory = item.file_type().is_dir();
            if !is_directory && !self.options.is_document_name(name) {
                continue;
            }
            if !self.stays_inside(item.path()) {
                continue;
            }
            let path = dir.join(name);
            match item.metadata() {
                Ok(metadata) => entries.push(build_entry(name, &path, &metadata)),
                Err(e) => log::warn!("Skipping '{path}': {e}"),
            }
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(DirectoryListing {
            name: dir.name().to_string(),
            path: dir.to_string(),
            entries,
        })
    }

    /// Resolve `raw_path` to an existing document file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the path is unsafe, hidden, missing,
    /// outside the root, a directory, or not a document.
    pub fn resolve_document(&self, raw_path: &str) -> Result<(CorpusPath, PathBuf)> {
        let path = self.parse_visible(raw_path)?;
        if !self.options.is_document_name(path.name()) {
            return Err(Error::not_found(raw_path));
        }
        let location = resolve_within_root(&self.root, &path)?;
        if location.is_dir() {
            return Err(Error::not_found(raw_path));
        }
        Ok((path, location))
    }

    /// Parse a request path that listings and the index would also show.
    fn parse_visible(&self, raw_path: &str) -> Result<CorpusPath> {
        let path = CorpusPath::parse(raw_path)?;
        if path.segments().iter().all(|s| self.options.is_visible(s)) {
            Ok(path)
        } else {
            Err(Error::not_found(raw_path))
        }
    }

    /// Start a fresh depth-first traversal over every document.
    pub fn documents(&self) -> DocumentWalk {
        let options = self.options.clone();
        let root = self.root.clone();
        let inner = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| options.is_visible(name))
            });

        DocumentWalk {
            inner: Box::new(inner),
            walker: self.clone(),
            root,
        }
    }

    fn stays_inside(&self, location: &Path) -> bool {
        match location.canonicalize() {
            Ok(real) if real.starts_with(&self.root) => true,
            Ok(real) => {
                log::debug!(
                    "Skipping {}: resolves outside the corpus root ({})",
                    location.display(),
                    real.display()
                );
                false
            }
            Err(e) => {
                log::warn!("Skipping {}: {e}", location.display());
                false
            }
        }
    }
}

/// Lazy depth-first sequence of documents under a corpus root.
///
/// Finite; each call to [`TreeWalker::documents`] starts a new traversal.
pub struct DocumentWalk {
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
    walker: TreeWalker,
    root: PathBuf,
}

impl Iterator for DocumentWalk {
    type Item = WalkedDocument;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = match self.inner.next()? {
                Ok(item) => item,
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        log::warn!(
                            "Skipping symlink loop back into {}",
                            ancestor.display()
                        );
                    } else {
                        log::warn!("Skipping unreadable entry: {e}");
                    }
                    continue;
                }
            };

            if item.file_type().is_dir() {
                continue;
            }
            let Some(name) = item.file_name().to_str() else {
                continue;
            };
            if !self.walker.options.is_document_name(name) {
                continue;
            }
            let Some(path) = item
                .path()
                .strip_prefix(&self.root)
                .ok()
                .and_then(CorpusPath::from_relative)
            else {
                continue;
            };
            if !self.walker.stays_inside(item.path()) {
                continue;
            }
            match item.metadata() {
                Ok(metadata) => {
                    return Some(WalkedDocument {
                        entry: build_entry(name, &path, &metadata),
                        path,
                        location: item.into_path(),
                    });
                }
                Err(e) => log::warn!("Skipping '{path}': {e}"),
            }
        }
    }
}

impl std::fmt::Debug for DocumentWalk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWalk")
            .field("root", &self.root)
            .finish()
    }
}

fn build_entry(name: &str, path: &CorpusPath, metadata: &Metadata) -> DocumentEntry {
    let is_directory = metadata.is_dir();
    let modified_time = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default();

    DocumentEntry {
        name: name.to_string(),
        path: path.to_string(),
        is_directory,
        size: if is_directory { 0 } else { metadata.len() },
        modified_time,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("b.md"), "# B").unwrap();
        fs::write(root.join("A.md"), "# A").unwrap();
        fs::write(root.join("notes.txt"), "not markdown").unwrap();
        fs::write(root.join(".hidden.md"), "hidden").unwrap();
        fs::create_dir(root.join("guides")).unwrap();
        fs::write(root.join("guides/intro.md"), "# Intro").unwrap();
        fs::create_dir(root.join("guides/deep")).unwrap();
        fs::write(root.join("guides/deep/leaf.markdown"), "leaf").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.md"), "nope").unwrap();
        dir
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let err = TreeWalker::new("/definitely/not/here", WalkOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let dir = corpus();
        let err = TreeWalker::new(dir.path().join("b.md"), WalkOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_list_root_order_and_filtering() {
        let dir = corpus();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let listing = walker.list(".").unwrap();

        assert_eq!(listing.name, ".");
        assert_eq!(listing.path, ".");
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["guides", "A.md", "b.md"]);

        let guides = &listing.entries[0];
        assert!(guides.is_directory);
        assert_eq!(guides.size, 0);
        assert_eq!(listing.entries[1].size, 3);
        assert!(listing.entries[1].modified_time > 0);
    }

    #[test]
    fn test_list_subdirectory_paths_are_prefixed() {
        let dir = corpus();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let listing = walker.list("guides/").unwrap();

        assert_eq!(listing.name, "guides");
        assert_eq!(listing.path, "guides");
        assert!(!listing.entries.is_empty());
        for entry in &listing.entries {
            assert!(entry.path.starts_with("guides/"), "{}", entry.path);
        }
    }

    #[test]
    fn test_list_not_found_cases() {
        let dir = corpus();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();
        for raw in ["missing", "b.md", "../", "guides/../..", "/etc"] {
            assert!(walker.list(raw).unwrap_err().is_not_found(), "{raw}");
        }
    }

    #[test]
    fn test_list_include_hidden() {
        let dir = corpus();
        let options = WalkOptions {
            include_hidden: true,
            ..Default::default()
        };
        let walker = TreeWalker::new(dir.path(), options).unwrap();
        let listing = walker.list(".").unwrap();
        assert!(listing.entries.iter().any(|e| e.name == ".hidden.md"));
        assert!(listing.entries.iter().any(|e| e.name == ".git"));
    }

    #[test]
    fn test_documents_depth_first_and_restartable() {
        let dir = corpus();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();

        let first: Vec<_> = walker.documents().map(|d| d.entry.path).collect();
        assert_eq!(
            first,
            vec!["A.md", "b.md", "guides/deep/leaf.markdown", "guides/intro.md"]
        );

        let second: Vec<_> = walker.documents().map(|d| d.entry.path).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_document() {
        let dir = corpus();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();

        let (path, location) = walker.resolve_document("./guides/intro.md").unwrap();
        assert_eq!(path.to_string(), "guides/intro.md");
        assert!(location.ends_with("guides/intro.md"));

        assert!(walker.resolve_document("guides").unwrap_err().is_not_found());
        assert!(walker.resolve_document("../b.md").unwrap_err().is_not_found());
    }

    #[test]
    fn test_point_lookups_respect_visibility() {
        let dir = corpus();
        fs::write(dir.path().join(".env"), "SECRET_KEY=hunter2").unwrap();
        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();

        for raw in [".env", ".hidden.md", ".git/config.md", "./.git/config.md", "notes.txt"] {
            assert!(walker.resolve_document(raw).unwrap_err().is_not_found(), "{raw}");
        }
        assert!(walker.list(".git").unwrap_err().is_not_found());

        let options = WalkOptions {
            include_hidden: true,
            ..Default::default()
        };
        let walker = TreeWalker::new(dir.path(), options).unwrap();
        assert!(walker.resolve_document(".git/config.md").is_ok());
        assert!(walker.list(".git").is_ok());
        assert!(walker.resolve_document(".env").unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_documents_skip_symlink_loop() {
        let dir = corpus();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("guides/loop")).unwrap();

        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let paths: Vec<_> = walker.documents().map(|d| d.entry.path).collect();
        assert_eq!(paths.len(), 4);
        assert!(!paths.iter().any(|p| p.contains("loop")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_outside_root_is_hidden() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.md"), "secret").unwrap();
        let dir = corpus();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();

        let walker = TreeWalker::new(dir.path(), WalkOptions::default()).unwrap();
        assert!(!walker.list(".").unwrap().entries.iter().any(|e| e.name == "escape"));
        assert!(!walker.documents().any(|d| d.entry.path.contains("secret")));
        assert!(walker.list("escape").unwrap_err().is_not_found());
    }
}
