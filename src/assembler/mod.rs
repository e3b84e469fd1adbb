//! Response assembly.
//!
//! [`ResponseAssembler`] consumes the frames of one exchange and keeps a
//! [`MessageView`] current: phase transitions, duplicate-token suppression,
//! the thinking/answer split, sources, labels and tool metadata.
//!
//! | event     | payload                              | effect                          |
//! |-----------|--------------------------------------|---------------------------------|
//! | `context` | `{sources, labels, tool_info}`       | merged into the view            |
//! | `token`   | `{t}`                                | appended, split recomputed      |
//! | `done`    | `{finish_reason}`                    | view finalized, phase `Idle`    |
//! | `error`   | `{message}`                          | phase `Error`, exchange ends    |

mod machine;
mod payload;
mod thinking;
mod view;

pub use machine::{ResponseAssembler, Step};
pub use payload::{ContextData, DoneData, ErrorData, Source, TokenData, ToolInfo};
pub use thinking::{split_thinking, ThinkingSplit, ThinkingState};
pub use view::{MessageView, Phase};

#[cfg(test)]
mod tests;
