//! Payload shapes carried in frame `data`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::highlight::{highlight_segments, HighlightRange, Segment};

/// A retrieved document fragment backing the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    /// Retrieval score in `0.0..=1.0`
    pub score: f64,
    pub filename: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub snippet: String,
    /// Match ranges over `snippet`, as `[start, end]` pairs
    #[serde(default)]
    pub highlights: Vec<HighlightRange>,
    /// Full fragment text, when the server chose to send it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

fn default_page() -> u32 {
    1
}

impl Source {
    /// Score as a percentage rounded to one decimal place
    pub fn score_percent(&self) -> f64 {
        (self.score * 1000.0).round() / 10.0
    }

    /// Snippet partitioned into plain and highlighted segments
    pub fn segments(&self) -> Vec<Segment<'_>> {
        highlight_segments(&self.snippet, &self.highlights)
    }
}

/// Metadata about a tool the server ran for this answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ToolInfo {
    /// Name of the read-only analytics query tool
    pub const DB_QUERY: &'static str = "db_analytics.query";

    pub fn is_db_query(&self) -> bool {
        self.name == Self::DB_QUERY
    }

    /// Number of result rows, zero when none were returned
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }
}

/// `context` payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// `{}` means no tool ran
    #[serde(default, deserialize_with = "empty_tool_info_as_none")]
    pub tool_info: Option<ToolInfo>,
}

fn empty_tool_info_as_none<'de, D>(deserializer: D) -> Result<Option<ToolInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
    match raw {
        Some(fields) if !fields.is_empty() => {
            serde_json::from_value(serde_json::Value::Object(fields))
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// `token` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub t: String,
}

/// `done` payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoneData {
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `error` payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub message: String,
}
