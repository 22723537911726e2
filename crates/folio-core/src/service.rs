//! Index lifecycle state.
//!
//! [`IndexHandle`] lets the owner of a search index publish its lifecycle
//! ([`IndexState`]) and lets anyone else (health probes, CLI progress, tests)
//! observe or await it.
//!
//! ```rust
//! use folio_core::service::{IndexHandle, IndexState};
//!
//! let handle = IndexHandle::new("corpus");
//! assert_eq!(handle.state(), IndexState::Empty);
//!
//! handle.set_state(IndexState::Building { generation: 1 });
//! handle.set_state(IndexState::Ready { generation: 1, documents: 12 });
//! assert!(handle.state().is_ready());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;

// ============================================================================
// IndexState
// ============================================================================

/// Lifecycle of a search index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IndexState {
    /// No snapshot has been built yet.
    Empty,
    /// A rebuild is running; queries still see the previous snapshot.
    Building {
        /// Generation being built.
        generation: u64,
    },
    /// A complete snapshot is being served.
    Ready {
        /// Generation being served.
        generation: u64,
        /// Number of documents in the snapshot.
        documents: usize,
    },
    /// The last build failed; the previous snapshot (if any) is still served.
    Failed {
        /// Why the build failed.
        reason: String,
    },
}

impl IndexState {
    /// Returns `true` when a complete snapshot is being served.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns `true` while a rebuild is in progress.
    pub fn is_building(&self) -> bool {
        matches!(self, Self::Building { .. })
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Building { generation } => write!(f, "building generation {generation}"),
            Self::Ready {
                generation,
                documents,
            } => write!(f, "ready: generation {generation}, {documents} documents"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

// ============================================================================
// IndexHandle
// ============================================================================

/// Shared handle for publishing and observing [`IndexState`].
///
/// Clones share the same underlying watch channel.
#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<IndexHandleInner>,
}

struct IndexHandleInner {
    name: String,
    tx: watch::Sender<IndexState>,
    created_at: Instant,
}

impl IndexHandle {
    /// Create a handle in the [`IndexState::Empty`] state.
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(IndexState::Empty);
        Self {
            inner: Arc::new(IndexHandleInner {
                name: name.into(),
                tx,
                created_at: Instant::now(),
            }),
        }
    }

    /// Index name, used in log lines.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current state.
    pub fn state(&self) -> IndexState {
        self.inner.tx.borrow().clone()
    }

    /// Publish a new state to all subscribers.
    pub fn set_state(&self, state: IndexState) {
        log::info!("Index '{}': {state}", self.inner.name);
        self.inner.tx.send_replace(state);
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<IndexState> {
        self.inner.tx.subscribe()
    }

    /// Wait until the index is ready or the build fails.
    ///
    /// Returns the `(generation, documents)` of the ready snapshot.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<(u64, usize), String> {
        let mut rx = self.subscribe();
        let outcome = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| matches!(s, IndexState::Ready { .. } | IndexState::Failed { .. })),
        )
        .await;

        match outcome {
            Err(_) => Err(format!(
                "Index '{}' not ready after {timeout:?} ({})",
                self.inner.name,
                self.state()
            )),
            Ok(Err(_)) => Err(format!("Index '{}' channel closed", self.inner.name)),
            Ok(Ok(state)) => match &*state {
                IndexState::Ready {
                    generation,
                    documents,
                } => Ok((*generation, *documents)),
                other => Err(format!("Index '{}' {other}", self.inner.name)),
            },
        }
    }

    /// Time since the handle was created.
    pub fn uptime(&self) -> Duration {
        self.inner.created_at.elapsed()
    }
}

impl fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
