//! Postings, snapshots and ranked queries.
//!
//! A build produces a complete [`IndexSnapshot`] off to the side; only then
//! is it swapped into the [`SearchIndex`]. Queries clone the current `Arc`
//! and run against that one generation, so a rebuild never exposes a half
//! populated table and never blocks a query for longer than the swap.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use folio_content::ParsedDocument;
use serde::Serialize;

use crate::snippet::extract_excerpt;
use crate::tokenizer::{query_terms, tokenize};
use crate::types::{QueryMode, SearchConfig, SearchParams, SearchResult};

/// Per-document posting data.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Corpus-relative path.
    pub path: String,
    /// Derived title.
    pub title: String,
    /// Occurrences of each term across title and body.
    pub term_frequencies: HashMap<String, u32>,
    /// Total terms across title and body.
    pub total_terms: u32,
    /// Raw body, kept for excerpts.
    pub body: String,
}

impl IndexEntry {
    /// Tokenize a parsed document's title and raw body.
    pub fn from_document(doc: &ParsedDocument) -> Self {
        let mut term_frequencies: HashMap<String, u32> = HashMap::new();
        let mut total_terms = 0u32;
        for term in tokenize(&doc.title).chain(tokenize(&doc.raw_content)) {
            *term_frequencies.entry(term).or_insert(0) += 1;
            total_terms = total_terms.saturating_add(1);
        }

        Self {
            path: doc.file_path.clone(),
            title: doc.title.clone(),
            term_frequencies,
            total_terms,
            body: doc.raw_content.clone(),
        }
    }

    /// Normalized frequency of one term in this document.
    pub fn term_score(&self, term: &str) -> f64 {
        if self.total_terms == 0 {
            return 0.0;
        }
        let count = self.term_frequencies.get(term).copied().unwrap_or(0);
        f64::from(count) / f64::from(self.total_terms)
    }
}

/// Figures from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Generation the build was published as.
    pub generation: u64,
    /// Documents in the snapshot.
    pub documents_indexed: usize,
    /// Files the owner could not read and left out.
    pub files_skipped: usize,
    /// Bytes of raw body text tokenized.
    pub bytes_processed: u64,
}

/// Accumulates documents into a new snapshot.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: Vec<IndexEntry>,
    seen: HashSet<String>,
    files_skipped: usize,
    bytes_processed: u64,
}

impl SnapshotBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document. A path already added is ignored.
    pub fn add(&mut self, doc: &ParsedDocument) {
        if !self.seen.insert(doc.file_path.clone()) {
            log::debug!("Ignoring duplicate document: {}", doc.file_path);
            return;
        }
        self.bytes_processed += doc.raw_content.len() as u64;
        self.entries.push(IndexEntry::from_document(doc));
    }

    /// Record a file the owner had to leave out.
    pub fn record_skipped(&mut self) {
        self.files_skipped += 1;
    }

    /// Documents added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into an immutable snapshot.
    pub fn finish(self, generation: u64) -> (IndexSnapshot, IndexStats) {
        let stats = IndexStats {
            generation,
            documents_indexed: self.entries.len(),
            files_skipped: self.files_skipped,
            bytes_processed: self.bytes_processed,
        };
        (IndexSnapshot::from_entries(generation, self.entries), stats)
    }
}

/// One immutable generation of the index.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    generation: u64,
    entries: Vec<IndexEntry>,
    postings: HashMap<String, Vec<usize>>,
    built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Generation zero, holding nothing.
    pub fn empty() -> Self {
        Self::from_entries(0, Vec::new())
    }

    fn from_entries(generation: u64, mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            for term in entry.term_frequencies.keys() {
                postings.entry(term.clone()).or_default().push(idx);
            }
        }

        Self {
            generation,
            entries,
            postings,
            built_at: Utc::now(),
        }
    }

    /// Build generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Documents in this snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct terms in this snapshot.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// When the snapshot was frozen.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Entry for a path, if indexed.
    pub fn entry(&self, path: &str) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Rank documents against distinct, already tokenized `terms`.
    pub fn query(
        &self,
        terms: &[String],
        mode: QueryMode,
        excerpt_width: usize,
        limit: Option<usize>,
    ) -> Vec<SearchResult> {
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scores: HashMap<usize, (f64, usize)> = HashMap::new();
        for term in terms {
            let Some(docs) = self.postings.get(term) else {
                continue;
            };
            for &idx in docs {
                let slot = scores.entry(idx).or_insert((0.0, 0));
                slot.0 += self.entries[idx].term_score(term);
                slot.1 += 1;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .filter(|(_, (_, matched))| mode == QueryMode::Or || *matched == terms.len())
            .map(|(idx, (score, _))| (idx, score))
            .collect();
        ranked.sort_by(|(a_idx, a_score), (b_idx, b_score)| {
            match b_score.total_cmp(a_score) {
                Ordering::Equal => self.entries[*a_idx].path.cmp(&self.entries[*b_idx].path),
                other => other,
            }
        });
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }

        ranked
            .into_iter()
            .map(|(idx, relevance)| {
                let entry = &self.entries[idx];
                SearchResult {
                    path: entry.path.clone(),
                    title: entry.title.clone(),
                    excerpt: extract_excerpt(&entry.body, terms, excerpt_width),
                    relevance,
                }
            })
            .collect()
    }
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Shared search index: the current snapshot behind an atomic swap.
#[derive(Debug)]
pub struct SearchIndex {
    current: RwLock<Arc<IndexSnapshot>>,
    next_generation: AtomicU64,
    config: SearchConfig,
}

impl SearchIndex {
    /// Create an index holding the empty generation.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::empty())),
            next_generation: AtomicU64::new(1),
            config,
        }
    }

    /// Search configuration in effect.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The snapshot queries currently see.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Reserve the generation number for a new build.
    pub fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, AtomicOrdering::Relaxed)
    }

    /// Publish a finished snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            "Publishing index generation {} ({} documents)",
            snapshot.generation(),
            snapshot.len()
        );
        std::mem::replace(&mut *guard, snapshot)
    }

    /// Build from `documents` and publish the result.
    pub fn build<I>(&self, documents: I) -> IndexStats
    where
        I: IntoIterator<Item = ParsedDocument>,
    {
        let mut builder = SnapshotBuilder::new();
        for doc in documents {
            builder.add(&doc);
        }
        let (snapshot, stats) = builder.finish(self.next_generation());
        self.replace(snapshot);
        stats
    }

    /// Rank documents for a free-text query using configured defaults.
    pub fn query(&self, text: &str) -> Vec<SearchResult> {
        self.search(&SearchParams::new(text))
    }

    /// Rank documents for a query with per-call overrides.
    ///
    /// An empty or whitespace-only query yields no results.
    pub fn search(&self, params: &SearchParams) -> Vec<SearchResult> {
        let terms = query_terms(&params.query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mode = params.mode.unwrap_or(self.config.query_mode);
        let limit = match (params.limit, self.config.max_results) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.snapshot()
            .query(&terms, mode, self.config.excerpt_width, limit)
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
