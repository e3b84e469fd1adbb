//! Highlight ranges over source snippets.
//!
//! Pure functions, safe to call from anywhere:
//!
//! - [`merge_ranges`] collapses overlapping and adjacent ranges
//! - [`highlight_segments`] partitions a snippet into plain and highlighted
//!   segments for rendering
//! - [`make_snippet`] cuts a window around the first query match
//!
//! ```rust
//! use sse_chat::highlight::{highlight_segments, merge_ranges, HighlightRange};
//!
//! let merged = merge_ranges(&[HighlightRange::new(0, 3), HighlightRange::new(2, 5)]);
//! assert_eq!(merged, vec![HighlightRange::new(0, 5)]);
//!
//! let segments = highlight_segments("abcdef", &merged);
//! assert_eq!(segments[0].text, "abcde");
//! assert!(segments[0].is_highlighted());
//! ```

mod merge;
mod snippet;

pub use merge::{highlight_segments, merge_ranges, HighlightRange, Segment, SegmentKind};
pub use snippet::{make_snippet, Snippet, DEFAULT_WINDOW};
