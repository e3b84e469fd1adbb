//! SSE Chat
//!
//! Client-side consumption of a streamed chat response. The crate turns an
//! arbitrarily chunked server-sent-event stream into typed frames, and those
//! frames into a stable view of the assistant message while the stream is
//! still open.
//!
//! ## Pipeline
//!
//! ```text
//! transport chunks ──► FrameParser ──► Frame ──► ResponseAssembler ──► MessageView + Phase
//! ```
//!
//! - [`frame`]: framing independent of chunk boundaries, `\n` / `\r\n` / `\r`
//!   line endings, flush of an unterminated trailing record
//! - [`assembler`]: phase machine, duplicate-token suppression, thinking/answer
//!   split, sources, labels and tool info
//! - [`highlight`]: merging of highlight ranges and snippet partitioning
//! - [`streaming`] (feature `streaming`): drive an exchange from an async
//!   chunk stream
//!
//! ## Usage
//!
//! ```rust
//! use sse_chat::{AssemblerConfig, Phase, ResponseAssembler};
//!
//! let mut assembler = ResponseAssembler::new(AssemblerConfig::default());
//! let mut exchange = assembler.start_exchange();
//!
//! exchange.push_chunk("event: context\ndata: {\"labels\":[\"RAG\"]}\n\n").unwrap();
//! exchange.push_chunk("event: token\ndata: {\"t\":\"<think>hm</think>Hel\"}\n\n").unwrap();
//! exchange.push_chunk("event: token\ndata: {\"t\":\"lo\"}\n\nevent: done\n").unwrap();
//! exchange.push_chunk("data: {\"finish_reason\":\"stop\"}\n\n").unwrap();
//! drop(exchange);
//!
//! let view = assembler.view();
//! assert_eq!(assembler.phase(), Phase::Idle);
//! assert_eq!(view.answer_text, "Hello");
//! assert_eq!(view.thinking_text, "hm");
//! assert_eq!(view.labels, vec!["RAG".to_string()]);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`trace` per frame, `debug` for phase
//! changes, `warn` for failed exchanges) and installs no subscriber.

// ============================================================================
// Ambient: configuration and errors
// ============================================================================

pub mod config;
pub mod error;

pub use config::{AssemblerConfig, ThinkingMarkers};
pub use error::{Result, StreamError};

// ============================================================================
// Framing
// ============================================================================

pub mod frame;
pub use frame::{EventKind, Frame, FrameParser};

// ============================================================================
// Response assembly
// ============================================================================

pub mod assembler;
pub use assembler::{
    split_thinking, MessageView, Phase, ResponseAssembler, Source, Step, ThinkingSplit,
    ThinkingState, ToolInfo,
};

pub mod exchange;
pub use exchange::Exchange;

// ============================================================================
// Highlighting
// ============================================================================

pub mod highlight;
pub use highlight::{highlight_segments, make_snippet, merge_ranges, HighlightRange, Segment};

// ============================================================================
// Streaming Support (optional feature)
// ============================================================================

#[cfg(feature = "streaming")]
pub mod streaming;
#[cfg(feature = "streaming")]
pub use streaming::drive;

// ============================================================================
// Tests
// ============================================================================
