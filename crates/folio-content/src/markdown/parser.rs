//! Markdown structure parsing.
//!
//! Heading and plain text is collected from `pulldown-cmark` events, so inline
//! formatting (emphasis, code spans, links) is stripped.
//!
//! ```rust
//! use folio_content::markdown::parser::{extract_first_heading, extract_title_heading};
//! use pulldown_cmark::HeadingLevel;
//!
//! let content = "Intro text\n\n## Setup\n\n# The *Real* Title";
//!
//! let (level, text) = extract_first_heading(content).unwrap();
//! assert_eq!(level, HeadingLevel::H2);
//! assert_eq!(text, "Setup");
//!
//! assert_eq!(extract_title_heading(content).as_deref(), Some("The Real Title"));
//! ```

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// Extract the first heading of any level.
pub fn extract_first_heading(content: &str) -> Option<(HeadingLevel, String)> {
    headings(content).next()
}

/// Extract the first top-level (`#`) heading.
pub fn extract_title_heading(content: &str) -> Option<String> {
    headings(content)
        .find(|(level, _)| *level == HeadingLevel::H1)
        .map(|(_, text)| text)
}

/// Plain text of a markdown document, markup stripped.
///
/// Block boundaries and line breaks become single spaces.
pub fn extract_text_content(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    for event in Parser::new(content) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_)
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Iterate over non-empty headings in document order.
fn headings(content: &str) -> impl Iterator<Item = (HeadingLevel, String)> + '_ {
    let mut parser = Parser::new(content);
    std::iter::from_fn(move || {
        let mut current: Option<(HeadingLevel, String)> = None;
        for event in parser.by_ref() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some((level, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            return Some((level, text.to_string()));
                        }
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push(' ');
                    }
                }
                _ => {}
            }
        }
        None
    })
}

// ============================================================================
// Tests
// ============================================================================
