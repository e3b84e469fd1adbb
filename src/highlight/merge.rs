//! Interval merging and snippet partitioning.

use serde::{Deserialize, Serialize};

/// Half-open character range `[start, end)` over a snippet.
///
/// Serialized as a two-element array, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

impl HighlightRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<(usize, usize)> for HighlightRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<HighlightRange> for (usize, usize) {
    fn from(range: HighlightRange) -> Self {
        (range.start, range.end)
    }
}

/// Merge ranges into the minimal sorted set of disjoint ranges covering the
/// same positions.
///
/// Overlapping and adjacent ranges (`a.end == b.start`) become one range.
/// Empty ranges are dropped. O(n log n).
pub fn merge_ranges(ranges: &[HighlightRange]) -> Vec<HighlightRange> {
    // Field order makes the derived Ord sort by start, then end
    let mut sorted: Vec<HighlightRange> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    sorted.sort_unstable();

    let mut merged: Vec<HighlightRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Whether a segment is emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Plain,
    Highlighted,
}

/// A run of snippet text with a single kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Character range of this segment within the snippet
    pub range: HighlightRange,
}

impl Segment<'_> {
    pub fn is_highlighted(&self) -> bool {
        self.kind == SegmentKind::Highlighted
    }
}

/// Partition `snippet` into alternating plain and highlighted segments.
///
/// Ranges are merged first and clamped to the snippet's character length.
/// The segments cover every character exactly once, in order, and none is
/// empty.
pub fn highlight_segments<'a>(snippet: &'a str, ranges: &[HighlightRange]) -> Vec<Segment<'a>> {
    // Byte offset of every char boundary, including the end
    let offsets: Vec<usize> = snippet
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(snippet.len()))
        .collect();
    let char_len = offsets.len() - 1;

    let mut segments = Vec::new();
    let mut push = |kind, start: usize, end: usize| {
        if start < end {
            segments.push(Segment {
                kind,
                text: &snippet[offsets[start]..offsets[end]],
                range: HighlightRange::new(start, end),
            });
        }
    };

    let mut cursor = 0;
    for range in merge_ranges(ranges) {
        let start = range.start.min(char_len);
        let end = range.end.min(char_len);
        push(SegmentKind::Plain, cursor, start);
        push(SegmentKind::Highlighted, start, end);
        cursor = end;
    }
    push(SegmentKind::Plain, cursor, char_len);

    segments
}
