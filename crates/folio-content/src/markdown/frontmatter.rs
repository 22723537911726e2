//! YAML frontmatter extraction from markdown files.
//!
//! Frontmatter is metadata at the start of a markdown file. The opening and
//! closing delimiters are lines consisting of exactly `---`:
//!
//! ```markdown
//! ---
//! title: My Document
//! date: 2025-07-24
//! tags:
//!   - rust
//!   - markdown
//! ---
//!
//! # Document Content
//! ```
//!
//! A block that is unterminated, or whose YAML is invalid or not a mapping,
//! is treated as if there were no frontmatter at all: the whole text becomes
//! the body. A single malformed document never fails a request.
//!
//! # Usage
//!
//! ```rust
//! use folio_content::markdown::extract_frontmatter;
//!
//! let result = extract_frontmatter("---\ntitle: Test\n---\n\nBody");
//! assert!(result.has_frontmatter());
//! assert_eq!(result.get_str("title"), Some("Test"));
//! assert_eq!(result.body().trim(), "Body");
//! ```

use folio_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// Delimiter line for frontmatter blocks.
pub const DELIMITER: &str = "---";

/// Result of frontmatter extraction.
#[derive(Debug, Clone)]
pub struct FrontmatterResult<'a> {
    /// Parsed mapping, if a well-formed block was found.
    mapping: Option<Mapping>,
    /// Body content (whole text when no well-formed block was found).
    body: &'a str,
    /// Whether both delimiters were found, even if the YAML was rejected.
    had_delimiters: bool,
}

impl<'a> FrontmatterResult<'a> {
    fn with_frontmatter(mapping: Mapping, body: &'a str) -> Self {
        Self {
            mapping: Some(mapping),
            body,
            had_delimiters: true,
        }
    }

    fn without_frontmatter(body: &'a str) -> Self {
        Self {
            mapping: None,
            body,
            had_delimiters: false,
        }
    }

    fn with_invalid_frontmatter(content: &'a str) -> Self {
        Self {
            mapping: None,
            body: content,
            had_delimiters: true,
        }
    }

    /// Check if a well-formed block was found and parsed.
    pub fn has_frontmatter(&self) -> bool {
        self.mapping.is_some()
    }

    /// Check if both delimiters were present (even if parsing failed).
    pub fn had_delimiters(&self) -> bool {
        self.had_delimiters
    }

    /// Parsed mapping, if present.
    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }

    /// Take ownership of the parsed mapping.
    pub fn into_mapping(self) -> Option<Mapping> {
        self.mapping
    }

    /// Body content (everything after the block).
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Deserialize the frontmatter into a specific type.
    ///
    /// Returns `None` if no frontmatter was found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the mapping does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.mapping {
            Some(mapping) => {
                let parsed: T = serde_yaml::from_value(Value::Mapping(mapping.clone()))
                    .map_err(|e| Error::parse(format!("Failed to deserialize frontmatter: {e}")))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Get a string field from the frontmatter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.mapping.as_ref()?.get(key)?.as_str()
    }
}

/// Extract YAML frontmatter from markdown content.
///
/// # Behavior
///
/// - First line is not exactly `---`: no frontmatter, body is the whole text
/// - No closing `---` line: no frontmatter, body is the whole text
/// - YAML invalid or not a mapping: no frontmatter, body is the whole text
/// - Empty block: empty mapping, body after the closing delimiter
pub fn extract_frontmatter(content: &str) -> FrontmatterResult<'_> {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return FrontmatterResult::without_frontmatter(content);
    };
    if !is_delimiter(first) {
        return FrontmatterResult::without_frontmatter(content);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut closing = None;
    for line in lines {
        if is_delimiter(line) {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = closing else {
        log::warn!("Frontmatter opening delimiter found but no closing delimiter");
        return FrontmatterResult::without_frontmatter(content);
    };

    let yaml = &content[yaml_start..yaml_end];
    let body = &content[body_start..];

    if yaml.trim().is_empty() {
        return FrontmatterResult::with_frontmatter(Mapping::new(), body);
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => FrontmatterResult::with_frontmatter(mapping, body),
        Ok(Value::Null) => FrontmatterResult::with_frontmatter(Mapping::new(), body),
        Ok(_) => {
            log::warn!("Frontmatter is not a key-value mapping; treating as body");
            FrontmatterResult::with_invalid_frontmatter(content)
        }
        Err(e) => {
            log::warn!("Failed to parse frontmatter YAML: {e}");
            FrontmatterResult::with_invalid_frontmatter(content)
        }
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

// ============================================================================
// Tests
// ============================================================================
