//! Markdown parsing and rendering utilities.
//!
//! - [`frontmatter`]: YAML frontmatter extraction
//! - [`parser`]: Markdown structure parsing (headings, plain text)
//! - [`render`]: HTML rendering

pub mod frontmatter;
pub mod parser;
pub mod render;

// Re-export key types and functions
pub use frontmatter::{FrontmatterResult, extract_frontmatter};
pub use parser::{extract_first_heading, extract_text_content, extract_title_heading};
pub use render::{RenderOptions, render_html, slugify};
