//! Markdown to HTML rendering.
//!
//! Rendering goes through `pulldown-cmark` with tables, strikethrough, task
//! lists and footnotes enabled. On top of the stock pipeline:
//!
//! - Raw HTML in the source is escaped unless [`RenderOptions::allow_raw_html`]
//!   is set.
//! - `javascript:`, `vbscript:` and `data:` link and image targets become `#`.
//! - Headings get slug ids (`# Getting Started` → `id="getting-started"`),
//!   duplicates suffixed `_1`, `_2`, …
//! - Relative links to other documents are resolved against the linking
//!   document's directory and rewritten to [`RenderOptions::link_prefix`]
//!   followed by the query-encoded corpus path.
//!
//! ```rust
//! use folio_content::markdown::render::{RenderOptions, render_html};
//! use folio_core::CorpusPath;
//!
//! let source = CorpusPath::parse("guides/intro.md").unwrap();
//! let html = render_html("See [setup](./setup.md#install).", &source, &RenderOptions::default());
//! assert!(html.contains("href=\"/api/content?path=guides/setup.md#install\""));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use folio_core::CorpusPath;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Rendering policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Pass raw HTML embedded in documents through unescaped.
    #[serde(default)]
    pub allow_raw_html: bool,

    /// Rewrite relative document links to [`Self::link_prefix`].
    #[serde(default = "default_rewrite_links")]
    pub rewrite_links: bool,

    /// Prefix for rewritten document links.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
}

fn default_rewrite_links() -> bool {
    true
}

fn default_link_prefix() -> String {
    "/api/content?path=".to_string()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            rewrite_links: default_rewrite_links(),
            link_prefix: default_link_prefix(),
        }
    }
}

/// Render markdown to HTML.
///
/// `source` is the corpus path of the document being rendered; it anchors
/// relative links.
pub fn render_html(markdown: &str, source: &CorpusPath, options: &RenderOptions) -> String {
    let mut parse_options = Options::empty();
    parse_options.insert(Options::ENABLE_TABLES);
    parse_options.insert(Options::ENABLE_STRIKETHROUGH);
    parse_options.insert(Options::ENABLE_TASKLISTS);
    parse_options.insert(Options::ENABLE_FOOTNOTES);

    let base = source.parent();
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, parse_options)
        .map(|event| transform(event, &base, options))
        .collect();
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn transform<'a>(event: Event<'a>, base: &CorpusPath, options: &RenderOptions) -> Event<'a> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !options.allow_raw_html => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: rewrite_link(dest_url, base, options),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize_scheme(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn neutralize_scheme(dest: CowStr<'_>) -> CowStr<'_> {
    let lowered = dest.trim_start().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        CowStr::Borrowed("#")
    } else {
        dest
    }
}

fn has_scheme(dest: &str) -> bool {
    match dest.find(':') {
        Some(colon) => !dest[..colon].contains(['/', '?', '#']),
        None => false,
    }
}

fn rewrite_link<'a>(dest: CowStr<'a>, base: &CorpusPath, options: &RenderOptions) -> CowStr<'a> {
    let dest = neutralize_scheme(dest);
    if !options.rewrite_links {
        return dest;
    }
    match resolve_document_link(&dest, base, &options.link_prefix) {
        Some(rewritten) => CowStr::from(rewritten),
        None => dest,
    }
}

/// Rewrite a relative link to another document, or `None` to leave it as is.
fn resolve_document_link(dest: &str, base: &CorpusPath, prefix: &str) -> Option<String> {
    if dest.is_empty() || dest.starts_with(['/', '#']) || has_scheme(dest) || dest.contains('?') {
        return None;
    }

    let (target, fragment) = match dest.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment)),
        None => (dest, None),
    };
    let lowered = target.to_ascii_lowercase();
    if !(lowered.ends_with(".md") || lowered.ends_with(".markdown")) {
        return None;
    }

    let mut segments: Vec<Cow<'_, str>> = base
        .segments()
        .iter()
        .map(|s| Cow::Borrowed(s.as_str()))
        .collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(urlencoding::decode(s).ok()?),
        }
    }

    // The path travels as a query value: `&`, `+`, `#` and `%` must not leak.
    let encoded: Vec<_> = segments.iter().map(|s| urlencoding::encode(s)).collect();
    let mut rewritten = format!("{prefix}{}", encoded.join("/"));
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }
    Some(rewritten)
}

/// Turn heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics and `_`, joins words with single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                j += 1;
            }

            let base = slugify(&text);
            let slug = match seen.get_mut(&base) {
                Some(count) => {
                    *count += 1;
                    format!("{base}_{count}")
                }
                None => {
                    seen.insert(base.clone(), 0);
                    base
                }
            };

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(slug));
            }
            i = j;
        }
        i += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================
