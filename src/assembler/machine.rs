//! Response assembly state machine.

use serde::de::DeserializeOwned;
use ulid::Ulid;

use super::payload::{ContextData, DoneData, ErrorData, TokenData};
use super::thinking::{partial_marker_len, split_thinking, ThinkingState};
use super::view::{MessageView, Phase};
use crate::config::AssemblerConfig;
use crate::error::{Result, StreamError};
use crate::frame::{EventKind, Frame};

/// What applying one frame did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The view changed
    Updated,
    /// Token identical to the previous one, dropped
    Duplicate,
    /// Frame had no effect (no active exchange, or an event kind the
    /// assembler does not handle)
    Ignored,
    /// `done` applied; the exchange is complete
    Finished,
}

/// Consumes frames of one exchange at a time and maintains the message view.
///
/// ```text
/// Idle --begin--> Waiting --first token--> Streaming --done--> Idle
/// Waiting|Streaming --error frame / transport / decode failure--> Error
/// Error --begin--> Waiting
/// ```
#[derive(Debug)]
pub struct ResponseAssembler {
    config: AssemblerConfig,
    phase: Phase,
    view: MessageView,
    /// An exchange is accepting frames
    active: bool,
}

impl Default for ResponseAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}

impl ResponseAssembler {
    /// Create an idle assembler
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            view: MessageView::new(),
            active: false,
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Get the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Get the message view of the current (or last) exchange
    pub fn view(&self) -> &MessageView {
        &self.view
    }

    /// Whether frames are currently being accepted
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start a new exchange (the user pressed send).
    ///
    /// Resets the view and moves to [`Phase::Waiting`]. Starting while
    /// another exchange is still in flight abandons that exchange.
    pub fn begin(&mut self) -> Ulid {
        if self.active {
            tracing::debug!(exchange = %self.view.id, phase = %self.phase, "Abandoning in-flight exchange");
        }
        self.view = MessageView::new();
        self.active = true;
        self.set_phase(Phase::Waiting);
        self.view.id
    }

    /// Apply one frame.
    ///
    /// Failures (an `error` frame or an undecodable payload) move the
    /// assembler to [`Phase::Error`] and are returned; frames after that are
    /// ignored until [`begin`](Self::begin) is called again.
    pub fn apply(&mut self, frame: &Frame) -> Result<Step> {
        if !self.active {
            tracing::trace!(event = %frame.event, phase = %self.phase, "No active exchange, frame ignored");
            return Ok(Step::Ignored);
        }
        tracing::trace!(event = %frame.event, len = frame.data.len(), "Applying frame");

        match &frame.event {
            EventKind::Context => {
                let context: ContextData = self.decode(frame)?;
                self.view.merge_context(context);
                Ok(Step::Updated)
            }
            EventKind::Token => {
                let token: TokenData = self.decode(frame)?;
                Ok(self.apply_token(token.t))
            }
            EventKind::Done => {
                let done: DoneData = self.decode(frame)?;
                self.finish(done);
                Ok(Step::Finished)
            }
            EventKind::Error => {
                let error: ErrorData = self.decode(frame)?;
                let message = if error.message.is_empty() {
                    "connection error".to_string()
                } else {
                    error.message
                };
                Err(self.fail(StreamError::Remote(message)))
            }
            EventKind::Message | EventKind::Unknown(_) => {
                tracing::debug!(event = %frame.event, "Unhandled event kind, frame ignored");
                Ok(Step::Ignored)
            }
        }
    }

    /// Record a transport failure reported for the current exchange.
    ///
    /// Returns the error so callers can propagate it. Without an active
    /// exchange the phase is left alone.
    pub fn transport_failed(&mut self, message: impl Into<String>) -> StreamError {
        let error = StreamError::Transport(message.into());
        if !self.active {
            tracing::debug!(phase = %self.phase, error = %error, "Transport error outside an exchange");
            return error;
        }
        self.fail(error)
    }

    /// Stop processing the current exchange. The phase is left untouched.
    pub fn abort(&mut self) {
        if self.active {
            tracing::debug!(exchange = %self.view.id, phase = %self.phase, "Exchange aborted");
            self.active = false;
        }
    }

    fn decode<T: DeserializeOwned>(&mut self, frame: &Frame) -> Result<T> {
        serde_json::from_str(&frame.data).map_err(|source| {
            self.fail(StreamError::Decode {
                event: frame.event.clone(),
                source,
            })
        })
    }

    fn apply_token(&mut self, text: String) -> Step {
        let repeated = self.view.last_raw_token.as_deref() == Some(text.as_str());
        if self.config.dedup_repeated_tokens && repeated {
            tracing::debug!(token = %text, "Dropping repeated token");
            return Step::Duplicate;
        }

        self.view.raw.push_str(&text);
        self.view.last_raw_token = Some(text);
        self.view.token_count += 1;

        if self.phase == Phase::Waiting {
            self.set_phase(Phase::Streaming);
        }
        self.refresh_split(false);
        Step::Updated
    }

    fn finish(&mut self, done: DoneData) {
        self.refresh_split(true);
        self.view.finish_reason = done.finish_reason;
        self.view.finished_at = Some(chrono::Utc::now());
        self.active = false;
        self.set_phase(Phase::Idle);
    }

    /// Recompute the thinking/answer split over the whole accumulation.
    fn refresh_split(&mut self, final_pass: bool) {
        let split = split_thinking(&self.view.raw, &self.config.thinking);
        let mut answer = split.answer;

        if !final_pass && self.config.hold_partial_markers && split.state == ThinkingState::Absent {
            let held = partial_marker_len(&answer, &self.config.thinking.start);
            answer.truncate(answer.len() - held);
        }

        self.view.answer_text = answer;
        self.view.thinking_text = split.thinking;
        self.view.thinking_state = split.state;
    }

    fn fail(&mut self, error: StreamError) -> StreamError {
        tracing::warn!(exchange = %self.view.id, error = %error, "Exchange failed");
        self.view.error = Some(error.to_string());
        self.view.finished_at = Some(chrono::Utc::now());
        self.active = false;
        self.set_phase(Phase::Error);
        error
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!(from = %self.phase, to = %phase, "Phase change");
            self.phase = phase;
        }
    }
}
