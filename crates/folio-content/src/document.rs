//! Parsed documents and their metadata.
//!
//! [`DocumentParser::parse`] is the single entry point: it splits the
//! frontmatter from the body, converts the YAML mapping into a closed
//! [`MetadataValue`] model, renders the body to HTML and derives a title.
//!
//! Title derivation is fixed:
//!
//! 1. a non-empty `title` frontmatter value
//! 2. the first top-level (`#`) heading in the body
//! 3. the file name without its extension

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use folio_core::CorpusPath;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::markdown::frontmatter::extract_frontmatter;
use crate::markdown::parser::extract_title_heading;
use crate::markdown::render::{RenderOptions, render_html};

/// Frontmatter key holding an explicit title.
pub const TITLE_KEY: &str = "title";

/// A single frontmatter value.
///
/// Serialized untagged, so dates come out as ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Calendar date written as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Timestamp written in RFC 3339 form.
    DateTime(DateTime<FixedOffset>),
    /// Any other scalar.
    String(String),
    /// Sequence of values.
    List(Vec<MetadataValue>),
    /// Nested mapping.
    Map(Metadata),
}

/// Frontmatter mapping, ordered by key.
pub type Metadata = BTreeMap<String, MetadataValue>;

impl MetadataValue {
    /// Convert a YAML value. Nulls and tagged values with null payloads yield `None`.
    pub fn from_yaml(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                None => n.as_f64().map(Self::Float),
            },
            Value::String(s) => Some(Self::from_string(s)),
            Value::Sequence(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_yaml).collect(),
            )),
            Value::Mapping(mapping) => Some(Self::Map(metadata_from_mapping(mapping))),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }

    fn from_string(s: String) -> Self {
        if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Self::Date(date);
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(&s) {
            return Self::DateTime(datetime);
        }
        Self::String(s)
    }

    /// String form of a scalar; `None` for lists and maps.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Date(d) => Some(d.to_string()),
            Self::DateTime(dt) => Some(dt.to_rfc3339()),
            Self::String(s) => Some(s.clone()),
            Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Borrow the string payload, if this is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

fn metadata_from_mapping(mapping: serde_yaml::Mapping) -> Metadata {
    mapping
        .into_iter()
        .filter_map(|(key, value)| {
            let key = match key {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    log::debug!("Skipping non-scalar frontmatter key: {other:?}");
                    return None;
                }
            };
            MetadataValue::from_yaml(value).map(|v| (key, v))
        })
        .collect()
}

/// One rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Original text with the frontmatter block stripped.
    pub raw_content: String,
    /// Rendered HTML, safe to embed.
    pub html_content: String,
    /// Frontmatter values (empty when absent or malformed).
    pub frontmatter: Metadata,
    /// Corpus-relative source path.
    pub file_path: String,
    /// Derived title.
    pub title: String,
}

/// Turns raw document text into [`ParsedDocument`]s.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    options: RenderOptions,
}

impl DocumentParser {
    /// Create a parser with the given rendering policy.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Rendering policy in effect.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parse and render one document. Never fails.
    pub fn parse(&self, raw_text: &str, path: &CorpusPath) -> ParsedDocument {
        let extracted = extract_frontmatter(raw_text);
        let body = extracted.body();
        let frontmatter = extracted
            .mapping()
            .cloned()
            .map(metadata_from_mapping)
            .unwrap_or_default();

        let title = derive_title(&frontmatter, body, path);
        let html_content = render_html(body, path, &self.options);

        ParsedDocument {
            raw_content: body.to_string(),
            html_content,
            frontmatter,
            file_path: path.to_string(),
            title,
        }
    }
}

/// Derive a title: frontmatter `title`, then first `#` heading, then file stem.
pub fn derive_title(frontmatter: &Metadata, body: &str, path: &CorpusPath) -> String {
    if let Some(title) = frontmatter
        .get(TITLE_KEY)
        .and_then(MetadataValue::as_scalar_string)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    {
        return title;
    }

    if let Some(heading) = extract_title_heading(body) {
        return heading;
    }

    file_stem(path.name()).to_string()
}

fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

// ============================================================================
// Tests
// ============================================================================
