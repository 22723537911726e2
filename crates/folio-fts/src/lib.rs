//! In-memory full-text search for Folio.
//!
//! The index is a pure function of the documents handed to it. It has no
//! filesystem awareness and no background work; its owner decides when to
//! rebuild.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      folio-fts                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchIndex (handle: RwLock<Arc<IndexSnapshot>>)           │
//! │  ├── snapshot()  → one immutable generation per query       │
//! │  └── replace()   → atomic swap after a complete build       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SnapshotBuilder (document-at-a-time, cancellable by owner) │
//! │  IndexSnapshot   (postings + per-document term frequencies) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tokenizer (case-folded alphanumeric runs)                  │
//! │  snippet   (excerpt window around the first hit)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Scoring
//!
//! A document's score is the sum, over distinct query terms it contains, of
//! `term occurrences / total terms in document`. Ties are broken by path.
//!
//! # Example
//!
//! ```rust
//! use folio_content::DocumentParser;
//! use folio_core::CorpusPath;
//! use folio_fts::{SearchConfig, SearchIndex};
//!
//! let parser = DocumentParser::default();
//! let docs = vec![
//!     parser.parse("alpha beta", &CorpusPath::parse("a.md").unwrap()),
//!     parser.parse("# Beta Doc\n\nbeta gamma", &CorpusPath::parse("b.md").unwrap()),
//! ];
//!
//! let index = SearchIndex::new(SearchConfig::default());
//! index.build(docs);
//!
//! // Both score 0.5; equal scores are ordered by path.
//! let hits = index.query("beta");
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[0].path, "a.md");
//! assert_eq!(hits[1].title, "Beta Doc");
//! ```

pub mod index;
pub mod snippet;
pub mod tokenizer;
pub mod types;

pub use index::{IndexEntry, IndexSnapshot, IndexStats, SearchIndex, SnapshotBuilder};
pub use snippet::extract_excerpt;
pub use tokenizer::{query_terms, tokenize};
pub use types::{QueryMode, SearchConfig, SearchParams, SearchResult};
