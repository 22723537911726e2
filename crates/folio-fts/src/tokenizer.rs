//! Term extraction.
//!
//! A term is a maximal run of alphanumeric characters (Unicode-aware),
//! lowercased. Everything else separates terms and empty terms never occur.
//! Documents and queries are tokenized identically.

/// A term and its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Lowercased term.
    pub term: String,
}

/// Tokens of `text` with their spans, in order.
pub fn token_spans(text: &str) -> impl Iterator<Item = Token> + '_ {
    let mut chars = text.char_indices().peekable();
    std::iter::from_fn(move || {
        let start = loop {
            let &(i, c) = chars.peek()?;
            if c.is_alphanumeric() {
                break i;
            }
            chars.next();
        };

        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_alphanumeric() {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }

        Some(Token {
            start,
            end,
            term: text[start..end].to_lowercase(),
        })
    })
}

/// Terms of `text`, in order, including repeats.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    token_spans(text).map(|token| token.term)
}

/// Distinct terms of a query, in first-seen order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in tokenize(query) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

// ============================================================================
// Tests
// ============================================================================
