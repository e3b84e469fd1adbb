//! Assembler configuration.
//!
//! Every field has a default, so an empty TOML document (or a missing file)
//! yields [`AssemblerConfig::default`]:
//!
//! ```toml
//! dedup_repeated_tokens = true
//! hold_partial_markers = true
//!
//! [thinking]
//! start = "<think>"
//! end = "</think>"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StreamError};

/// Delimiters of the thinking segment inside the raw token accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingMarkers {
    pub start: String,
    pub end: String,
}

impl Default for ThinkingMarkers {
    fn default() -> Self {
        Self {
            start: "<think>".to_string(),
            end: "</think>".to_string(),
        }
    }
}

/// Behaviour switches for [`ResponseAssembler`](crate::ResponseAssembler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Drop a token that is byte-for-byte identical to the previous one.
    ///
    /// Guards against upstream retransmission, but also swallows a genuine
    /// repeated emission. Turn off when the upstream never retransmits.
    pub dedup_repeated_tokens: bool,

    /// While streaming, keep a trailing partial start marker out of the
    /// visible answer so the answer never shrinks when the marker completes.
    pub hold_partial_markers: bool,

    /// Thinking segment delimiters
    pub thinking: ThinkingMarkers,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            dedup_repeated_tokens: true,
            hold_partial_markers: true,
            thinking: ThinkingMarkers::default(),
        }
    }
}

impl AssemblerConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file.
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| StreamError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded assembler configuration");
        Ok(config)
    }

    /// Builder: toggle duplicate-token suppression
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup_repeated_tokens = enabled;
        self
    }

    /// Builder: use custom thinking markers
    pub fn with_markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.thinking = ThinkingMarkers {
            start: start.into(),
            end: end.into(),
        };
        self
    }

    /// Builder: toggle partial start-marker hold-back
    pub fn with_marker_holdback(mut self, enabled: bool) -> Self {
        self.hold_partial_markers = enabled;
        self
    }
}
