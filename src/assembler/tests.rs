//! Tests for response assembly

use super::*;
use crate::config::{AssemblerConfig, ThinkingMarkers};
use crate::frame::{EventKind, Frame, FrameParser};
use crate::StreamError;
use pretty_assertions::assert_eq;

fn token(t: &str) -> Frame {
    Frame::new(EventKind::Token, serde_json::json!({ "t": t }).to_string())
}

fn done() -> Frame {
    Frame::new(EventKind::Done, "{\"finish_reason\":\"stop\"}")
}

fn started(config: AssemblerConfig) -> ResponseAssembler {
    let mut assembler = ResponseAssembler::new(config);
    assembler.begin();
    assembler
}

fn feed_tokens(assembler: &mut ResponseAssembler, tokens: &[&str]) {
    for t in tokens {
        assembler.apply(&token(t)).unwrap();
    }
}

#[test]
fn test_phase_transitions() {
    let mut assembler = ResponseAssembler::default();
    assert_eq!(assembler.phase(), Phase::Idle);

    assembler.begin();
    assert_eq!(assembler.phase(), Phase::Waiting);

    // Context alone does not start streaming
    let context = Frame::new(EventKind::Context, "{\"labels\":[\"RAG\"]}");
    assert_eq!(assembler.apply(&context).unwrap(), Step::Updated);
    assert_eq!(assembler.phase(), Phase::Waiting);
    assert!(assembler.view().context_received);

    assembler.apply(&token("Hi")).unwrap();
    assert_eq!(assembler.phase(), Phase::Streaming);

    assert_eq!(assembler.apply(&done()).unwrap(), Step::Finished);
    assert_eq!(assembler.phase(), Phase::Idle);
    assert!(!assembler.is_active());
    assert!(assembler.view().finished_at.is_some());
}

#[test]
fn test_rag_hello_over_split_chunks() {
    let payload = "event: context\r\n\
data: {\"sources\":[],\"labels\":[\"RAG\"]}\r\n\r\n\
event: token\ndata: {\"t\":\"Hel\"}\n\n\
event: token\ndata: {\"t\":\"lo\"}\n\n\
event: done\ndata: {\"finish_reason\":\"stop\"}\n\n";

    for offset in 0..=payload.len() {
        let mut parser = FrameParser::new();
        let mut assembler = started(AssemblerConfig::default());
        let mut frames = parser.feed(&payload[..offset]);
        frames.extend(parser.feed(&payload[offset..]));
        frames.extend(parser.finish());
        for frame in &frames {
            assembler.apply(frame).unwrap();
        }

        assert_eq!(assembler.view().answer_text, "Hello", "split at {}", offset);
        assert_eq!(assembler.phase(), Phase::Idle);
        assert_eq!(assembler.view().labels, vec!["RAG".to_string()]);
        assert_eq!(assembler.view().token_count, 2);
    }
}

#[test]
fn test_error_frame_is_terminal() {
    let mut assembler = started(AssemblerConfig::default());
    let error = Frame::new(EventKind::Error, "{\"message\":\"boom\"}");

    let err = assembler.apply(&error).unwrap_err();
    assert!(matches!(err, StreamError::Remote(ref m) if m == "boom"));
    assert_eq!(assembler.phase(), Phase::Error);

    // Nothing after the error is processed
    assert_eq!(assembler.apply(&token("late")).unwrap(), Step::Ignored);
    assert_eq!(assembler.apply(&done()).unwrap(), Step::Ignored);
    assert_eq!(assembler.phase(), Phase::Error);
    assert_eq!(assembler.view().raw, "");
}

#[test]
fn test_error_frame_without_message() {
    let mut assembler = started(AssemblerConfig::default());
    let err = assembler
        .apply(&Frame::new(EventKind::Error, "{}"))
        .unwrap_err();
    assert_eq!(err.to_string(), "server error: connection error");
}

#[test]
fn test_error_then_new_exchange() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["partial"]);
    let _ = assembler.transport_failed("reset by peer");
    assert_eq!(assembler.phase(), Phase::Error);
    assert_eq!(assembler.view().error.as_deref(), Some("transport error: reset by peer"));

    let first_id = assembler.view().id;
    let id = assembler.begin();
    assert_ne!(id, first_id);
    assert_eq!(assembler.phase(), Phase::Waiting);
    assert_eq!(assembler.view().raw, "");
    assert!(assembler.view().error.is_none());
}

#[test]
fn test_decode_failure_is_fatal_and_atomic() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["ok"]);

    // `labels` has the wrong type: nothing from this frame may be applied
    let bad_context = Frame::new(
        EventKind::Context,
        "{\"sources\":[],\"labels\":\"RAG\",\"tool_info\":{\"name\":\"x\"}}",
    );
    let err = assembler.apply(&bad_context).unwrap_err();
    assert!(matches!(err, StreamError::Decode { event: EventKind::Context, .. }));
    assert_eq!(assembler.phase(), Phase::Error);
    assert!(assembler.view().labels.is_empty());
    assert!(assembler.view().tool_info.is_none());
    assert_eq!(assembler.view().answer_text, "ok");
}

#[test]
fn test_token_without_text_field() {
    let mut assembler = started(AssemblerConfig::default());
    let err = assembler
        .apply(&Frame::new(EventKind::Token, "{\"text\":\"x\"}"))
        .unwrap_err();
    assert!(matches!(err, StreamError::Decode { event: EventKind::Token, .. }));
}

#[test]
fn test_dedup_consecutive_identical_tokens() {
    let mut assembler = started(AssemblerConfig::default());

    assert_eq!(assembler.apply(&token("a")).unwrap(), Step::Updated);
    assert_eq!(assembler.apply(&token("a")).unwrap(), Step::Duplicate);
    assert_eq!(assembler.view().raw, "a");
    assert_eq!(assembler.view().token_count, 1);

    // Only the immediately preceding token counts
    feed_tokens(&mut assembler, &["b", "a"]);
    assert_eq!(assembler.view().raw, "aba");
    assert_eq!(assembler.view().last_raw_token.as_deref(), Some("a"));
}

#[test]
fn test_dedup_disabled() {
    let mut assembler = started(AssemblerConfig::default().with_dedup(false));
    feed_tokens(&mut assembler, &["l", "l"]);
    assert_eq!(assembler.view().raw, "ll");
    assert_eq!(assembler.view().token_count, 2);
}

#[test]
fn test_thinking_split_across_tokens() {
    let mut assembler = started(AssemblerConfig::default());

    feed_tokens(&mut assembler, &["<thi", "nk>plan the", " reply</th"]);
    assert_eq!(assembler.view().thinking_state, ThinkingState::InProgress);
    assert_eq!(assembler.view().thinking_text, "");
    assert_eq!(assembler.view().answer_text, "");

    feed_tokens(&mut assembler, &["ink>Hello"]);
    assert_eq!(assembler.view().thinking_state, ThinkingState::Closed);
    assert_eq!(assembler.view().thinking_text, "plan the reply");
    assert_eq!(assembler.view().answer_text, "Hello");
    assert!(assembler.view().has_thinking());
}

#[test]
fn test_partial_start_marker_held_back() {
    let mut assembler = started(AssemblerConfig::default());

    feed_tokens(&mut assembler, &["Sure <th"]);
    assert_eq!(assembler.view().answer_text, "Sure ");

    feed_tokens(&mut assembler, &["ink>hmm</think>!"]);
    assert_eq!(assembler.view().answer_text, "Sure !");
    assert_eq!(assembler.view().thinking_text, "hmm");
}

#[test]
fn test_held_back_text_released_on_done() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["a <"]);
    assert_eq!(assembler.view().answer_text, "a ");

    feed_tokens(&mut assembler, &[" b and c"]);
    assert_eq!(assembler.view().answer_text, "a < b and c");

    feed_tokens(&mut assembler, &[" <"]);
    assert_eq!(assembler.view().answer_text, "a < b and c ");
    assembler.apply(&done()).unwrap();
    assert_eq!(assembler.view().answer_text, "a < b and c <");
}

#[test]
fn test_holdback_disabled() {
    let mut assembler = started(AssemblerConfig::default().with_marker_holdback(false));
    feed_tokens(&mut assembler, &["Sure <th"]);
    assert_eq!(assembler.view().answer_text, "Sure <th");
}

#[test]
fn test_answer_never_shrinks_while_streaming() {
    let raw = "Intro <think>secret</think> and the answer";
    let mut assembler = started(AssemblerConfig::default().with_dedup(false));
    let mut previous = String::new();
    for c in raw.chars() {
        assembler.apply(&token(&c.to_string())).unwrap();
        let answer = assembler.view().answer_text.clone();
        assert!(answer.starts_with(&previous), "{:?} -> {:?}", previous, answer);
        previous = answer;
    }
    assert_eq!(previous, "Intro  and the answer");
}

#[test]
fn test_custom_markers() {
    let config = AssemblerConfig::default().with_markers("<reasoning>", "</reasoning>");
    let mut assembler = started(config);
    feed_tokens(&mut assembler, &["<reasoning>why</reasoning>because"]);
    assert_eq!(assembler.view().thinking_text, "why");
    assert_eq!(assembler.view().answer_text, "because");
}

#[test]
fn test_context_merge() {
    let mut assembler = started(AssemblerConfig::default());
    let first = Frame::new(
        EventKind::Context,
        r#"{"labels":["RAG"],"sources":[{"id":"s1","score":0.8764,"filename":"faq.pdf","snippet":"abcdef","highlights":[[1,3],[2,4]]}]}"#,
    );
    let second = Frame::new(
        EventKind::Context,
        r#"{"labels":["RAG","DB Tool"],"sources":[{"id":"s1","score":0.5,"filename":"faq.pdf","snippet":"x"}],"tool_info":{"name":"db_analytics.query","sql":"SELECT 1","rows":[{"n":1}]}}"#,
    );
    assembler.apply(&first).unwrap();
    assembler.apply(&second).unwrap();

    let view = assembler.view();
    assert_eq!(view.labels, vec!["RAG".to_string(), "DB Tool".to_string()]);
    assert_eq!(view.sources.len(), 1);

    let source = &view.sources[0];
    assert_eq!(source.page, 1);
    assert_eq!(source.score_percent(), 87.6);
    assert_eq!(source.segments().len(), 3);

    let tool = view.tool_info.as_ref().unwrap();
    assert!(tool.is_db_query());
    assert_eq!(tool.row_count(), 1);
}

#[test]
fn test_frames_before_begin_and_after_done_ignored() {
    let mut assembler = ResponseAssembler::default();
    assert_eq!(assembler.apply(&token("x")).unwrap(), Step::Ignored);
    assert_eq!(assembler.phase(), Phase::Idle);

    assembler.begin();
    feed_tokens(&mut assembler, &["done soon"]);
    assembler.apply(&done()).unwrap();
    assert_eq!(assembler.apply(&token("more")).unwrap(), Step::Ignored);
    assert_eq!(assembler.view().answer_text, "done soon");
}

#[test]
fn test_unknown_and_message_events_ignored() {
    let mut assembler = started(AssemblerConfig::default());
    let unknown = Frame::new(EventKind::Unknown("metrics".into()), "not json");
    let message = Frame::new(EventKind::Message, "plain");
    assert_eq!(assembler.apply(&unknown).unwrap(), Step::Ignored);
    assert_eq!(assembler.apply(&message).unwrap(), Step::Ignored);
    assert_eq!(assembler.phase(), Phase::Waiting);
}

#[test]
fn test_abort_keeps_phase() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["half"]);
    assembler.abort();

    assert_eq!(assembler.phase(), Phase::Streaming);
    assert_eq!(assembler.apply(&token("rest")).unwrap(), Step::Ignored);
    assert_eq!(assembler.view().answer_text, "half");
}

#[test]
fn test_split_thinking_pure() {
    let markers = ThinkingMarkers::default();

    let split = split_thinking("plain answer", &markers);
    assert_eq!(split.state, ThinkingState::Absent);
    assert_eq!(split.answer, "plain answer");
    assert_eq!(split.thinking, "");

    let split = split_thinking("pre<think>still going", &markers);
    assert_eq!(split.state, ThinkingState::InProgress);
    assert_eq!(split.answer, "pre");
    assert_eq!(split.thinking, "");

    let split = split_thinking("pre<think>t</think>post<think>again</think>", &markers);
    assert_eq!(split.state, ThinkingState::Closed);
    assert_eq!(split.thinking, "t");
    assert_eq!(split.answer, "prepost<think>again</think>");

    // Idempotent over the same accumulation
    assert_eq!(
        split_thinking("a<think>b</think>c", &markers),
        split_thinking("a<think>b</think>c", &markers)
    );
}

#[test]
fn test_split_thinking_empty_marker() {
    let markers = ThinkingMarkers {
        start: String::new(),
        end: "</think>".to_string(),
    };
    let split = split_thinking("a</think>b", &markers);
    assert_eq!(split.state, ThinkingState::Absent);
    assert_eq!(split.answer, "a</think>b");
}

#[test]
fn test_view_serializes_for_renderer() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["hi"]);
    let json = serde_json::to_value(assembler.view()).unwrap();
    assert_eq!(json["answer_text"], "hi");
    assert_eq!(json["thinking_state"], "absent");
    assert!(json.get("error").is_none());
    assert_eq!(serde_json::to_value(Phase::Streaming).unwrap(), "streaming");
}

#[test]
fn test_transport_error_after_done_keeps_idle() {
    let mut assembler = started(AssemblerConfig::default());
    feed_tokens(&mut assembler, &["fin"]);
    assembler.apply(&done()).unwrap();

    let err = assembler.transport_failed("late reset");
    assert!(err.is_exchange_failure());
    assert_eq!(assembler.phase(), Phase::Idle);
    assert!(assembler.view().error.is_none());
}

#[test]
fn test_context_with_empty_tool_info() {
    let mut assembler = started(AssemblerConfig::default());
    let context = Frame::new(
        EventKind::Context,
        r#"{"sources":[{"id":"d0","score":0.9,"filename":"faq.txt","page":1,"snippet":"abc","highlights":[[0,1]]}],"labels":[],"tool_info":{}}"#,
    );

    assert_eq!(assembler.apply(&context).unwrap(), Step::Updated);
    assert_eq!(assembler.phase(), Phase::Waiting);
    assert_eq!(assembler.view().sources.len(), 1);
    assert!(assembler.view().tool_info.is_none());

    // An empty object later on does not clear a tool already reported
    let with_tool = Frame::new(EventKind::Context, r#"{"tool_info":{"name":"db_analytics.query"}}"#);
    assembler.apply(&with_tool).unwrap();
    assembler.apply(&Frame::new(EventKind::Context, r#"{"tool_info":{}}"#)).unwrap();
    assert!(assembler.view().tool_info.as_ref().unwrap().is_db_query());

    // Null is accepted too; a non-empty object without a name is still malformed
    assembler.apply(&Frame::new(EventKind::Context, r#"{"tool_info":null}"#)).unwrap();
    let err = assembler
        .apply(&Frame::new(EventKind::Context, r#"{"tool_info":{"sql":"SELECT 1"}}"#))
        .unwrap_err();
    assert!(matches!(err, StreamError::Decode { event: EventKind::Context, .. }));
}
