//! Markdown parsing, frontmatter extraction, and HTML rendering.
//!
//! This crate turns the raw text of one document into a [`ParsedDocument`].
//! It never touches the filesystem; callers hand it text and a corpus path.
//!
//! # Modules
//!
//! - [`markdown`]: Markdown parsing and rendering
//!   - [`markdown::frontmatter`]: YAML frontmatter extraction
//!   - [`markdown::parser`]: Heading and plain-text extraction
//!   - [`markdown::render`]: Safe HTML rendering with heading ids and link rewriting
//! - [`document`]: `ParsedDocument`, metadata values, and title derivation
//!
//! # Example
//!
//! ```rust
//! use folio_content::{DocumentParser, RenderOptions};
//! use folio_core::CorpusPath;
//!
//! let parser = DocumentParser::new(RenderOptions::default());
//! let path = CorpusPath::parse("guides/intro.md").unwrap();
//! let doc = parser.parse("---\ntitle: Intro\n---\n\n# Welcome\n\nHello.", &path);
//!
//! assert_eq!(doc.title, "Intro");
//! assert!(doc.html_content.contains("<h1 id=\"welcome\">Welcome</h1>"));
//! ```

pub mod document;
pub mod markdown;

pub use document::{DocumentParser, Metadata, MetadataValue, ParsedDocument};
pub use markdown::render::RenderOptions;
