//! Error types for stream consumption.

use std::path::PathBuf;
use thiserror::Error;

use crate::frame::EventKind;

/// Everything that can end an exchange early, plus configuration failures.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport reported a failure (connection drop, non-2xx, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// A frame's payload was not valid for its event kind
    #[error("malformed `{event}` payload: {source}")]
    Decode {
        /// Event kind of the offending frame
        event: EventKind,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The far side sent an explicit `error` frame
    #[error("server error: {0}")]
    Remote(String),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file exists but could not be read
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl StreamError {
    /// Whether this error terminates an exchange (as opposed to a setup error).
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Decode { .. } | Self::Remote(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
