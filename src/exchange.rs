//! One request/response cycle: raw chunks in, view updates out.

use crate::assembler::{MessageView, Phase, ResponseAssembler, Step};
use crate::error::Result;
use crate::frame::{Frame, FrameParser};

type Observer<'a> = Box<dyn FnMut(&MessageView, Phase) + 'a>;

/// Couples a fresh [`FrameParser`] with a borrowed [`ResponseAssembler`].
///
/// The mutable borrow is what keeps a single exchange active per
/// assembler: a second one cannot start until this one is dropped.
///
/// ```rust
/// use sse_chat::{Phase, ResponseAssembler};
///
/// let mut assembler = ResponseAssembler::default();
/// let mut exchange = assembler.start_exchange();
/// exchange.push_chunk("event: token\ndata: {\"t\":\"Hi\"}\n\nevent: do").unwrap();
/// let finished = exchange.push_chunk("ne\ndata: {}\n\n").unwrap();
/// assert!(finished);
/// drop(exchange);
///
/// assert_eq!(assembler.phase(), Phase::Idle);
/// assert_eq!(assembler.view().answer_text, "Hi");
/// ```
pub struct Exchange<'a> {
    parser: FrameParser,
    assembler: &'a mut ResponseAssembler,
    observer: Option<Observer<'a>>,
}

impl ResponseAssembler {
    /// Begin a new exchange and return the handle that feeds it.
    pub fn start_exchange(&mut self) -> Exchange<'_> {
        self.begin();
        Exchange {
            parser: FrameParser::new(),
            assembler: self,
            observer: None,
        }
    }
}

impl<'a> Exchange<'a> {
    /// Builder: call `observer` synchronously after every frame that
    /// changed the view.
    pub fn on_update(mut self, observer: impl FnMut(&MessageView, Phase) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Get the assembler's current phase
    pub fn phase(&self) -> Phase {
        self.assembler.phase()
    }

    /// Get the message view being assembled
    pub fn view(&self) -> &MessageView {
        self.assembler.view()
    }

    /// Feed a text chunk. Returns `true` once the exchange has finished.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<bool> {
        let frames = self.parser.feed(chunk);
        self.apply_all(frames)
    }

    /// Feed a byte chunk. Returns `true` once the exchange has finished.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<bool> {
        let frames = self.parser.feed_bytes(chunk);
        self.apply_all(frames)
    }

    /// The transport closed the stream.
    ///
    /// An unterminated trailing record is applied first. A stream that
    /// closes without a terminal frame counts as a transport failure.
    pub fn close(&mut self) -> Result<()> {
        if let Some(frame) = self.parser.finish() {
            self.apply_all(vec![frame])?;
        }
        if self.assembler.is_active() {
            let error = self
                .assembler
                .transport_failed("stream closed before a terminal frame");
            self.notify();
            return Err(error);
        }
        Ok(())
    }

    /// The transport reported an error. Returns it for propagation.
    pub fn transport_error(&mut self, message: impl Into<String>) -> crate::StreamError {
        self.parser.fail();
        let error = self.assembler.transport_failed(message);
        self.notify();
        error
    }

    /// Cancel the exchange. No further frames are processed and the phase
    /// stays where it was.
    pub fn abort(self) {
        // Drop does the work
        drop(self);
    }

    fn apply_all(&mut self, frames: Vec<Frame>) -> Result<bool> {
        for frame in &frames {
            match self.assembler.apply(frame) {
                Ok(Step::Updated) => self.notify(),
                Ok(Step::Finished) => {
                    self.parser.abort();
                    self.notify();
                    return Ok(true);
                }
                Ok(Step::Duplicate | Step::Ignored) => {}
                Err(error) => {
                    self.parser.fail();
                    self.notify();
                    return Err(error);
                }
            }
        }
        Ok(!self.assembler.is_active())
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(self.assembler.view(), self.assembler.phase());
        }
    }
}

/// Dropping an exchange (or a future driving it) ends it like
/// [`Exchange::abort`]: later frames are ignored and the phase is kept.
impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        self.parser.abort();
        self.assembler.abort();
    }
}

impl std::fmt::Debug for Exchange<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("parser", &self.parser)
            .field("assembler", &self.assembler)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
