//! Type definitions for stream frames.

use serde::{Deserialize, Serialize};

/// Event kind of a frame.
///
/// Closed set of the kinds the chat protocol uses, with [`EventKind::Unknown`]
/// carrying any other name so new server events pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Default kind of a record without an `event:` line
    #[default]
    Message,
    /// Retrieval context: sources, labels, tool info
    Context,
    /// A generated text fragment
    Token,
    /// Normal end of generation
    Done,
    /// Server-side failure
    Error,
    /// Any other event name
    Unknown(String),
}

impl EventKind {
    /// Resolve an event name as it appears on the wire
    pub fn from_name(name: &str) -> Self {
        match name {
            "" | "message" => Self::Message,
            "context" => Self::Context,
            "token" => Self::Token,
            "done" => Self::Done,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Context => "context",
            Self::Token => "token",
            Self::Done => "done",
            Self::Error => "error",
            Self::Unknown(name) => name,
        }
    }

    /// Whether this kind ends an exchange
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One complete record from the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Event kind (`message` when the record had no `event:` line)
    pub event: EventKind,
    /// All `data:` lines of the record joined with `"\n"`
    pub data: String,
    /// Last `id:` value of the record, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Frame {
    /// Create a frame without an id
    pub fn new(event: EventKind, data: impl Into<String>) -> Self {
        Self {
            event,
            data: data.into(),
            id: None,
        }
    }

    /// Builder: attach an id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
