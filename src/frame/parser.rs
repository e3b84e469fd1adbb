//! Incremental frame parser.

use super::types::{EventKind, Frame};

/// Lifecycle of a parser instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Open,
    Closed,
    Failed,
    Aborted,
}

/// Fields collected for the record currently being assembled.
#[derive(Debug, Default)]
struct PendingRecord {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    has_fields: bool,
}

impl PendingRecord {
    fn apply_line(&mut self, line: &str) {
        // Comment
        if line.starts_with(':') {
            return;
        }

        // Lines without a colon carry no recognised field
        let Some((field, value)) = line.split_once(':') else {
            return;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "event" => {
                self.event = Some(value.trim().to_string());
                self.has_fields = true;
            }
            "data" => {
                self.data.push(value.to_string());
                self.has_fields = true;
            }
            "id" => {
                self.id = Some(value.to_string());
                self.has_fields = true;
            }
            _ => {
                tracing::trace!(field, "Ignoring unknown field");
            }
        }
    }

    fn take_frame(&mut self) -> Option<Frame> {
        if !self.has_fields {
            return None;
        }
        let record = std::mem::take(self);
        let event = record
            .event
            .as_deref()
            .map(EventKind::from_name)
            .unwrap_or_default();

        Some(Frame {
            event,
            data: record.data.join("\n"),
            id: record.id,
        })
    }
}

/// Buffers raw chunks and yields complete frames.
///
/// Records are separated by a blank line; lines end with `"\n"`, `"\r\n"`
/// or a bare `"\r"`. Framing is independent of chunk boundaries: feeding
/// the same text in any split produces the same frames, in the order their
/// terminating blank lines were seen.
#[derive(Debug)]
pub struct FrameParser {
    /// Unterminated tail of the current line
    line: String,
    /// Previous chunk ended with `'\r'`; a leading `'\n'` belongs to it
    pending_cr: bool,
    record: PendingRecord,
    /// Incomplete UTF-8 sequence from the end of the last byte chunk
    utf8_tail: Vec<u8>,
    state: ParserState,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser for a fresh stream
    pub fn new() -> Self {
        Self {
            line: String::new(),
            pending_cr: false,
            record: PendingRecord::default(),
            utf8_tail: Vec::new(),
            state: ParserState::Open,
        }
    }

    /// Whether the parser still accepts input
    pub fn is_open(&self) -> bool {
        self.state == ParserState::Open
    }

    /// Whether buffered, not yet framed text is held
    pub fn has_pending(&self) -> bool {
        !self.line.is_empty() || self.record.has_fields || !self.utf8_tail.is_empty()
    }

    /// Feed a text chunk, returning every frame it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<Frame> {
        let mut frames = Vec::new();
        if !self.is_open() {
            tracing::trace!(state = ?self.state, "Ignoring chunk after end of stream");
            return frames;
        }
        if chunk.is_empty() {
            return frames;
        }

        let mut rest = chunk;
        if self.pending_cr {
            self.pending_cr = false;
            rest = rest.strip_prefix('\n').unwrap_or(rest);
        }

        while let Some(pos) = rest.find(|c: char| c == '\r' || c == '\n') {
            self.line.push_str(&rest[..pos]);
            let is_cr = rest.as_bytes()[pos] == b'\r';
            rest = &rest[pos + 1..];

            if is_cr {
                if let Some(after_lf) = rest.strip_prefix('\n') {
                    rest = after_lf;
                } else if rest.is_empty() {
                    self.pending_cr = true;
                }
            }

            if let Some(frame) = self.end_line() {
                frames.push(frame);
            }
        }
        self.line.push_str(rest);

        frames
    }

    /// Feed a raw byte chunk.
    ///
    /// A multi-byte character split across chunks is held until its last
    /// byte arrives. Invalid sequences decode to U+FFFD.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Frame> {
        if !self.is_open() {
            return Vec::new();
        }
        let text = self.decode_utf8(bytes);
        self.feed(&text)
    }

    /// Signal stream close.
    ///
    /// Flushes a buffered, unterminated record as a final frame. Payloads
    /// that omit the trailing blank line rely on this.
    pub fn finish(&mut self) -> Option<Frame> {
        if !self.is_open() {
            return None;
        }
        self.state = ParserState::Closed;

        if !self.utf8_tail.is_empty() {
            let tail = std::mem::take(&mut self.utf8_tail);
            self.line.push_str(&String::from_utf8_lossy(&tail));
        }
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.record.apply_line(&line);
        }
        self.pending_cr = false;

        let frame = self.record.take_frame();
        if let Some(ref frame) = frame {
            tracing::debug!(event = %frame.event, "Flushed unterminated record at close");
        }
        frame
    }

    /// Signal a transport failure: buffered text is discarded and parsing stops.
    pub fn fail(&mut self) {
        if self.is_open() {
            self.discard();
            self.state = ParserState::Failed;
        }
    }

    /// Caller-initiated cancellation: buffered text is discarded and later
    /// chunks are ignored.
    pub fn abort(&mut self) {
        if self.is_open() {
            self.discard();
            self.state = ParserState::Aborted;
        }
    }

    fn discard(&mut self) {
        self.line.clear();
        self.utf8_tail.clear();
        self.pending_cr = false;
        self.record = PendingRecord::default();
    }

    fn end_line(&mut self) -> Option<Frame> {
        let line = std::mem::take(&mut self.line);
        if line.is_empty() {
            let frame = self.record.take_frame()?;
            tracing::trace!(event = %frame.event, len = frame.data.len(), "Frame complete");
            return Some(frame);
        }
        self.record.apply_line(&line);
        None
    }

    fn decode_utf8(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.utf8_tail);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut input = buf.as_slice();
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = input.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.utf8_tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}
