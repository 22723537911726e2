//! Excerpt extraction.
//!
//! Excerpts are cut from the raw document body, not the rendered HTML. The
//! window is centred on the first case-insensitive occurrence of any query
//! term, widened to roughly `width` characters and trimmed back to whole
//! words. Occurrences are literal, so `alpha` also hits inside `alphabet`.
//! Whitespace is collapsed and `...` marks a cut at either end.

const ELLIPSIS: &str = "...";

/// Excerpt of `body` around the first occurrence of any of `terms`.
///
/// Falls back to the leading text when no term occurs in the body (for
/// example when only the title matched).
pub fn extract_excerpt(body: &str, terms: &[String], width: usize) -> String {
    match find_first_occurrence(body, terms) {
        Some((start, end)) => window(body, start, end, width),
        None => leading(body, width),
    }
}

/// Byte range of the earliest case-insensitive occurrence of any term.
///
/// Terms are expected lowercased, as the tokenizer produces them.
fn find_first_occurrence(body: &str, terms: &[String]) -> Option<(usize, usize)> {
    body.char_indices().find_map(|(start, _)| {
        terms
            .iter()
            .filter(|term| !term.is_empty())
            .find_map(|term| folded_prefix_len(&body[start..], term))
            .map(|len| (start, start + len))
    })
}

/// Byte length of the prefix of `text` that lowercases to `term`, if any.
fn folded_prefix_len(text: &str, term: &str) -> Option<usize> {
    let mut expected = term.chars().peekable();
    for (i, c) in text.char_indices() {
        if expected.peek().is_none() {
            return Some(i);
        }
        for folded in c.to_lowercase() {
            if expected.next() != Some(folded) {
                return None;
            }
        }
    }
    expected.peek().is_none().then_some(text.len())
}

fn window(body: &str, hit_start: usize, hit_end: usize, width: usize) -> String {
    let half = width / 2;

    let mut start = body[..hit_start]
        .char_indices()
        .rev()
        .take(half)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(hit_start);
    let mut end = body[hit_end..]
        .char_indices()
        .nth(half)
        .map(|(i, _)| hit_end + i)
        .unwrap_or(body.len());

    if start > 0 && !preceded_by_whitespace(body, start) {
        if let Some(ws) = body[start..hit_start].find(char::is_whitespace) {
            start += ws;
        }
    }
    if end < body.len() && !starts_with_whitespace(&body[end..]) {
        if let Some(ws) = body[hit_end..end].rfind(char::is_whitespace) {
            end = hit_end + ws;
        }
    }

    decorate(body, start, end)
}

fn leading(body: &str, width: usize) -> String {
    let mut end = body
        .char_indices()
        .nth(width)
        .map(|(i, _)| i)
        .unwrap_or(body.len());

    if end < body.len() && !starts_with_whitespace(&body[end..]) {
        if let Some(ws) = body[..end].rfind(char::is_whitespace) {
            end = ws;
        }
    }

    decorate(body, 0, end)
}

fn decorate(body: &str, start: usize, end: usize) -> String {
    let mut excerpt = normalize_whitespace(&body[start..end]);
    if !body[..start].trim().is_empty() {
        excerpt.insert_str(0, ELLIPSIS);
    }
    if !body[end..].trim().is_empty() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}

fn preceded_by_whitespace(body: &str, at: usize) -> bool {
    body[..at].chars().next_back().is_some_and(char::is_whitespace)
}

fn starts_with_whitespace(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_whitespace)
}

/// Collapse runs of whitespace to single spaces and trim.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
