//! Phase indicator and the in-progress message view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::payload::{ContextData, Source, ToolInfo};
use super::thinking::ThinkingState;

/// Coarse progress of the current exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No exchange in flight
    #[default]
    Idle,
    /// Request sent, no token yet
    Waiting,
    /// Tokens arriving
    Streaming,
    /// Exchange failed; a new exchange must be started explicitly
    Error,
}

impl Phase {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Streaming => "streaming",
            Self::Error => "error",
        }
    }

    /// Whether an exchange is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Waiting | Self::Streaming)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The assistant message being assembled from the stream.
///
/// Owned by one [`ResponseAssembler`](super::ResponseAssembler); renderers
/// only ever see it through a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    /// Exchange identifier, assigned at send
    pub id: Ulid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// User-visible answer (thinking segment and markers removed)
    pub answer_text: String,
    /// Completed thinking segment, hidden by default
    pub thinking_text: String,
    pub thinking_state: ThinkingState,

    pub labels: Vec<String>,
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_info: Option<ToolInfo>,
    /// Whether a `context` frame has been applied
    pub context_received: bool,

    /// Text of the last applied token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_raw_token: Option<String>,
    /// Concatenation of every applied token
    pub raw: String,
    /// Number of applied tokens
    pub token_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Failure message, set when the exchange ends in error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageView {
    /// Empty view for a new exchange
    pub fn new() -> Self {
        Self {
            id: Ulid::new(),
            started_at: Utc::now(),
            finished_at: None,
            answer_text: String::new(),
            thinking_text: String::new(),
            thinking_state: ThinkingState::Absent,
            labels: Vec::new(),
            sources: Vec::new(),
            tool_info: None,
            context_received: false,
            last_raw_token: None,
            raw: String::new(),
            token_count: 0,
            finish_reason: None,
            error: None,
        }
    }

    /// Whether there is thinking text worth offering to the user
    pub fn has_thinking(&self) -> bool {
        !self.thinking_text.trim().is_empty()
    }

    /// Merge a `context` payload.
    ///
    /// Labels keep first-seen order without repeats, sources are appended
    /// unless a source with the same id is already present, and tool info
    /// is replaced when the payload carries one.
    pub(crate) fn merge_context(&mut self, context: ContextData) {
        for label in context.labels {
            if !self.labels.contains(&label) {
                self.labels.push(label);
            }
        }
        for source in context.sources {
            if !self.sources.iter().any(|s| s.id == source.id) {
                self.sources.push(source);
            }
        }
        if context.tool_info.is_some() {
            self.tool_info = context.tool_info;
        }
        self.context_received = true;
    }
}

impl Default for MessageView {
    fn default() -> Self {
        Self::new()
    }
}
