//! Snippet extraction around a query match.

use serde::{Deserialize, Serialize};

use super::merge::HighlightRange;

/// Characters kept on each side of the match
pub const DEFAULT_WINDOW: usize = 180;

/// A text excerpt and the ranges to emphasize within it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub highlights: Vec<HighlightRange>,
}

/// Cut a snippet around the first case-insensitive occurrence of `query`.
///
/// The snippet spans up to `window` characters on each side of the match,
/// and the match is returned as a range relative to the snippet. With an
/// empty query, or no match, the snippet is the first `2 * window`
/// characters and carries no highlights.
pub fn make_snippet(text: &str, query: &str, window: usize) -> Snippet {
    if text.is_empty() {
        return Snippet::default();
    }

    let chars: Vec<char> = text.chars().collect();
    let head = || Snippet {
        text: chars.iter().take(window.saturating_mul(2)).collect(),
        highlights: Vec::new(),
    };

    let query: Vec<char> = query.trim().chars().map(fold_case).collect();
    if query.is_empty() {
        return head();
    }

    let folded: Vec<char> = chars.iter().copied().map(fold_case).collect();
    let Some(idx) = folded.windows(query.len()).position(|w| w == query.as_slice()) else {
        return head();
    };

    let start = idx.saturating_sub(window);
    let end = chars.len().min(idx + query.len() + window);
    let rel = idx - start;

    Snippet {
        text: chars[start..end].iter().collect(),
        highlights: vec![HighlightRange::new(rel, rel + query.len())],
    }
}

/// Single-char lowercase mapping, so match positions line up with `text`
fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
