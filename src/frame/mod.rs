//! Server-sent-event framing.
//!
//! [`FrameParser`] turns an arbitrarily chunked text (or byte) stream into an
//! ordered sequence of [`Frame`]s. It knows nothing about payload semantics:
//! decoding `data` is left to the caller, usually the
//! [`ResponseAssembler`](crate::ResponseAssembler).
//!
//! ## Usage
//!
//! ```rust
//! use sse_chat::frame::{EventKind, FrameParser};
//!
//! let mut parser = FrameParser::new();
//! let mut frames = parser.feed("event: token\r\ndata: {\"t\":\"Hel");
//! assert!(frames.is_empty());
//!
//! frames.extend(parser.feed("\"}\r\n\r\ndata: trailing"));
//! frames.extend(parser.finish());
//!
//! assert_eq!(frames[0].event, EventKind::Token);
//! assert_eq!(frames[0].data, "{\"t\":\"Hel\"}");
//! assert_eq!(frames[1].event, EventKind::Message);
//! ```

mod parser;
mod types;

pub use parser::FrameParser;
pub use types::{EventKind, Frame};
