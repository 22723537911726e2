//! Common search types.

use serde::{Deserialize, Serialize};

/// How multiple query terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// A document matches if it contains any query term.
    #[default]
    Or,
    /// A document matches only if it contains every distinct query term.
    And,
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default query mode.
    #[serde(default)]
    pub query_mode: QueryMode,

    /// Approximate excerpt width in characters.
    #[serde(default = "default_excerpt_width")]
    pub excerpt_width: usize,

    /// Cap on returned results; `None` returns every match.
    #[serde(default)]
    pub max_results: Option<usize>,
}

fn default_excerpt_width() -> usize {
    150
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_mode: QueryMode::default(),
            excerpt_width: default_excerpt_width(),
            max_results: None,
        }
    }
}

/// Parameters for a single search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text query.
    pub query: String,

    /// Query mode override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<QueryMode>,

    /// Result limit override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchParams {
    /// Parameters for `query` with configured defaults.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Override the query mode.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Override the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Corpus-relative document path.
    pub path: String,

    /// Document title.
    pub title: String,

    /// Body text around the first matching term.
    pub excerpt: String,

    /// Normalized term-frequency score (higher is better).
    pub relevance: f64,
}

// ============================================================================
// Tests
// ============================================================================
