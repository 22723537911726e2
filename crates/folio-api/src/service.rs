//! Content service: the orchestrator behind every operation.
//!
//! [`ContentService`] owns the tree walker, the document parser and the
//! search index. Listings and document reads go straight to the live tree;
//! searches go to the current index snapshot. [`ContentService::reindex`] is
//! the only operation that mutates shared state and it runs one at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_content::{DocumentParser, ParsedDocument, RenderOptions};
use folio_core::{DirectoryListing, Error, IndexHandle, IndexState, Result, TreeWalker, WalkOptions};
use folio_fts::{
    IndexSnapshot, IndexStats, SearchConfig, SearchIndex, SearchParams, SearchResult,
    SnapshotBuilder,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Name reported by the health probe.
pub const SERVICE_NAME: &str = "folio";

/// Everything needed to open a [`ContentService`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Corpus root directory.
    pub root: PathBuf,
    /// Which entries the walker sees.
    #[serde(default)]
    pub walk: WalkOptions,
    /// HTML rendering policy.
    #[serde(default)]
    pub render: RenderOptions,
    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,
}

impl ServiceConfig {
    /// Defaults for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            walk: WalkOptions::default(),
            render: RenderOptions::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy`, or `degraded` after a failed build.
    pub status: &'static str,
    /// Service identity.
    pub service: &'static str,
    /// Index lifecycle.
    pub index: IndexState,
}

/// Shared content service. Clones are cheap and share state.
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    walker: TreeWalker,
    parser: DocumentParser,
    index: SearchIndex,
    handle: IndexHandle,
    reindex_lock: Mutex<()>,
}

impl ContentService {
    /// Create a service over `config.root` without building the index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the root is missing or not a directory.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let walker = TreeWalker::new(&config.root, config.walk)?;
        log::debug!("Serving corpus at {}", walker.root().display());
        Ok(Self {
            inner: Arc::new(ServiceInner {
                walker,
                parser: DocumentParser::new(config.render),
                index: SearchIndex::new(config.search),
                handle: IndexHandle::new(SERVICE_NAME),
                reindex_lock: Mutex::new(()),
            }),
        })
    }

    /// Create a service and run the startup build.
    pub async fn open(config: ServiceConfig) -> Result<Self> {
        let service = Self::new(config)?;
        service.reindex(&CancellationToken::new()).await?;
        Ok(service)
    }

    /// Canonical corpus root.
    pub fn root(&self) -> &Path {
        self.inner.walker.root()
    }

    /// Lifecycle handle of the search index.
    pub fn index_handle(&self) -> &IndexHandle {
        &self.inner.handle
    }

    /// The snapshot searches currently run against.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.inner.index.snapshot()
    }

    /// List one directory of the live tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the path is unsafe, missing or not a
    /// directory.
    pub fn list_directory(&self, path: &str) -> Result<DirectoryListing> {
        self.inner.walker.list(path)
    }

    /// Read and parse one document from the live tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the path is unsafe, missing or a
    /// directory, and [`Error::InvalidDocument`] if the file cannot be read
    /// or is not UTF-8.
    pub fn get_document(&self, path: &str) -> Result<ParsedDocument> {
        let (corpus_path, location) = self.inner.walker.resolve_document(path)?;
        let text = read_text(&location, path)?;
        Ok(self.inner.parser.parse(&text, &corpus_path))
    }

    /// Search with configured defaults. Never fails.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.inner.index.query(query)
    }

    /// Search with per-call overrides. Never fails.
    pub fn search_with(&self, params: &SearchParams) -> Vec<SearchResult> {
        self.inner.index.search(params)
    }

    /// Rebuild the index from the live tree and publish it.
    ///
    /// Rebuilds are serialized. Cancelling `cancel`, or dropping the returned
    /// future, stops the walk between documents and leaves the previous
    /// snapshot and lifecycle state in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before the swap.
    pub async fn reindex(&self, cancel: &CancellationToken) -> Result<IndexStats> {
        let _serial = self.inner.reindex_lock.lock().await;

        let token = cancel.child_token();
        let _abandon = token.clone().drop_guard();

        let generation = self.inner.index.next_generation();
        let restore = RestoreState::new(&self.inner.handle);
        self.inner
            .handle
            .set_state(IndexState::Building { generation });

        let service = self.clone();
        let built =
            tokio::task::spawn_blocking(move || service.build_snapshot(generation, &token)).await;

        match built {
            Ok(Ok((snapshot, stats))) => {
                self.inner.index.replace(snapshot);
                self.inner.handle.set_state(IndexState::Ready {
                    generation,
                    documents: stats.documents_indexed,
                });
                restore.disarm();
                log::info!(
                    "Indexed {} documents ({} skipped, {} bytes) as generation {generation}",
                    stats.documents_indexed,
                    stats.files_skipped,
                    stats.bytes_processed
                );
                Ok(stats)
            }
            Ok(Err(err)) if err.is_cancelled() => {
                log::warn!("Reindex of generation {generation} cancelled; keeping previous index");
                Err(err)
            }
            Ok(Err(err)) => {
                self.inner.handle.set_state(IndexState::Failed {
                    reason: err.to_string(),
                });
                restore.disarm();
                Err(err)
            }
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(_) => Err(Error::Cancelled("reindex")),
        }
    }

    fn build_snapshot(
        &self,
        generation: u64,
        cancel: &CancellationToken,
    ) -> Result<(IndexSnapshot, IndexStats)> {
        let mut builder = SnapshotBuilder::new();
        for walked in self.inner.walker.documents() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled("reindex"));
            }
            let display = walked.path.to_string();
            match read_text(&walked.location, &display) {
                Ok(text) => builder.add(&self.inner.parser.parse(&text, &walked.path)),
                Err(err) => {
                    log::warn!("Leaving '{display}' out of the index: {err}");
                    builder.record_skipped();
                }
            }
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled("reindex"));
        }
        Ok(builder.finish(generation))
    }

    /// Liveness report with the index lifecycle.
    pub fn health(&self) -> HealthReport {
        let index = self.inner.handle.state();
        let status = match index {
            IndexState::Failed { .. } => "degraded",
            _ => "healthy",
        };
        HealthReport {
            status,
            service: SERVICE_NAME,
            index,
        }
    }
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("root", &self.root())
            .field("index", &self.inner.handle.state())
            .finish_non_exhaustive()
    }
}

/// Puts the lifecycle state back unless a build outcome was recorded.
///
/// Covers cancellation and a dropped `reindex` future alike.
struct RestoreState<'a> {
    handle: &'a IndexHandle,
    previous: Option<IndexState>,
}

impl<'a> RestoreState<'a> {
    fn new(handle: &'a IndexHandle) -> Self {
        Self {
            handle,
            previous: Some(handle.state()),
        }
    }

    fn disarm(mut self) {
        self.previous = None;
    }
}

impl Drop for RestoreState<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.handle.set_state(previous);
        }
    }
}

/// Read a document as UTF-8, dropping a leading byte-order mark.
fn read_text(location: &Path, display: &str) -> Result<String> {
    let bytes = std::fs::read(location).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::not_found(display),
        _ => Error::invalid_document(display, e),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        Error::invalid_document(
            display,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::task::Poll;
    use std::time::Duration;
    use tempfile::TempDir;

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "alpha beta").unwrap();
        fs::write(dir.path().join("b.md"), "# Beta Doc\n\nbeta gamma").unwrap();
        fs::write(dir.path().join("c.md"), "").unwrap();
        dir
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let err = ContentService::new(ServiceConfig::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_new_starts_empty() {
        let dir = corpus();
        let service = ContentService::new(ServiceConfig::new(dir.path())).unwrap();
        assert_eq!(service.index_handle().state(), IndexState::Empty);
        assert!(service.search("beta").is_empty());
    }

    #[test]
    fn test_read_text_strips_bom_and_rejects_binary() {
        let dir = TempDir::new().unwrap();
        let bom = dir.path().join("bom.md");
        fs::write(&bom, "\u{feff}# Title").unwrap();
        assert_eq!(read_text(&bom, "bom.md").unwrap(), "# Title");

        let binary = dir.path().join("bin.md");
        fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(
            read_text(&binary, "bin.md"),
            Err(Error::InvalidDocument { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_builds_index() {
        let dir = corpus();
        let service = ContentService::open(ServiceConfig::new(dir.path()))
            .await
            .unwrap();

        let hits = service.search("beta");
        let paths: Vec<_> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
        assert!(matches!(
            service.index_handle().state(),
            IndexState::Ready {
                generation: 1,
                documents: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_reindex_keeps_previous_snapshot() {
        let dir = corpus();
        let service = ContentService::open(ServiceConfig::new(dir.path()))
            .await
            .unwrap();
        fs::write(dir.path().join("d.md"), "delta").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = service.reindex(&cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(service.snapshot().generation(), 1);
        assert!(service.search("delta").is_empty());
        assert!(service.index_handle().state().is_ready());
    }

    #[tokio::test]
    async fn test_dropped_reindex_restores_state() {
        let dir = corpus();
        for i in 0..500 {
            fs::write(dir.path().join(format!("bulk{i:03}.md")), "filler words here").unwrap();
        }
        let service = ContentService::open(ServiceConfig::new(dir.path()))
            .await
            .unwrap();
        let before = service.index_handle().state();

        let cancel = CancellationToken::new();
        let mut pending = Box::pin(service.reindex(&cancel));
        let first = std::future::poll_fn(|cx| Poll::Ready(pending.as_mut().poll(cx))).await;
        assert!(first.is_pending());
        assert!(service.index_handle().state().is_building());

        drop(pending);
        assert_eq!(service.index_handle().state(), before);
        assert!(!cancel.is_cancelled());
        assert_eq!(service.snapshot().generation(), 1);
        assert_eq!(service.health().status, "healthy");

        let stats = service.reindex(&CancellationToken::new()).await.unwrap();
        assert_eq!(stats.generation, 3);
        assert_eq!(stats.documents_indexed, 503);
    }

    #[tokio::test]
    async fn test_abandoned_reindex_times_out_cleanly() {
        let dir = corpus();
        for i in 0..2000 {
            fs::write(dir.path().join(format!("bulk{i:04}.md")), "filler words here").unwrap();
        }
        let service = ContentService::new(ServiceConfig::new(dir.path())).unwrap();

        let cancel = CancellationToken::new();
        let outcome =
            tokio::time::timeout(Duration::from_millis(1), service.reindex(&cancel)).await;
        if outcome.is_err() {
            assert_eq!(service.index_handle().state(), IndexState::Empty);
            assert_eq!(service.snapshot().generation(), 0);
        }
        assert!(!service.index_handle().state().is_building());
    }

    #[tokio::test]
    async fn test_health_reports_index_state() {
        let dir = corpus();
        let service = ContentService::open(ServiceConfig::new(dir.path()))
            .await
            .unwrap();

        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, SERVICE_NAME);

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["index"]["state"], "ready");
        assert_eq!(json["index"]["documents"], 3);
    }
}
