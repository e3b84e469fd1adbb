//! Thinking/answer split over the raw token accumulation.

use serde::{Deserialize, Serialize};

use crate::config::ThinkingMarkers;

/// Where the accumulation stands with respect to the thinking segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingState {
    /// No start marker seen
    #[default]
    Absent,
    /// Start marker seen, end marker not yet
    InProgress,
    /// Both markers seen
    Closed,
}

/// Result of [`split_thinking`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThinkingSplit {
    pub thinking: String,
    pub answer: String,
    pub state: ThinkingState,
}

/// Split the full raw accumulation into thinking and answer text.
///
/// `thinking` is the text strictly between the first start marker and the
/// first end marker after it. Until that end marker arrives, `thinking` is
/// empty and `answer` is whatever precedes the start marker. Markers are
/// stripped from both. An empty start marker disables the split.
///
/// The function is pure: callers recompute it over the whole accumulation
/// after every token, which is what makes markers straddling token
/// boundaries come out right.
pub fn split_thinking(raw: &str, markers: &ThinkingMarkers) -> ThinkingSplit {
    let start = markers.start.as_str();
    let end = markers.end.as_str();

    let Some(open) = raw.find(start).filter(|_| !start.is_empty()) else {
        return ThinkingSplit {
            thinking: String::new(),
            answer: raw.to_string(),
            state: ThinkingState::Absent,
        };
    };

    let body_start = open + start.len();
    let close = if end.is_empty() {
        None
    } else {
        raw[body_start..].find(end).map(|rel| body_start + rel)
    };

    match close {
        None => ThinkingSplit {
            thinking: String::new(),
            answer: raw[..open].to_string(),
            state: ThinkingState::InProgress,
        },
        Some(close) => {
            let mut answer = String::with_capacity(raw.len() - (close + end.len() - open));
            answer.push_str(&raw[..open]);
            answer.push_str(&raw[close + end.len()..]);
            ThinkingSplit {
                thinking: raw[body_start..close].to_string(),
                answer,
                state: ThinkingState::Closed,
            }
        }
    }
}

/// Length in bytes of the longest proper prefix of `marker` that `text`
/// ends with.
pub(crate) fn partial_marker_len(text: &str, marker: &str) -> usize {
    (1..marker.len())
        .rev()
        .filter(|&k| marker.is_char_boundary(k))
        .find(|&k| text.ends_with(&marker[..k]))
        .unwrap_or(0)
}
