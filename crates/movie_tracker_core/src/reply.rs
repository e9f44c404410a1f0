//! crates/movie_tracker_core/src/reply.rs
//!
//! Best-effort parsing of the model's structured reply. The model is asked
//! for a fixed JSON shape but routinely wraps it in markdown code fences or
//! produces free text, so the fence strip is a pure transform and the parse
//! is a fallible function — never a panic.

use crate::domain::StructuredAssistantReply;
use crate::ports::{ChatError, ChatResult};

/// Removes a surrounding markdown code fence, if present.
///
/// Handles both ``` and ```json openers. Idempotent: applying it to already
/// stripped text returns the text unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the opener line (which may carry a language tag such as "json").
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Attempts to parse an assistant message as the structured reply contract.
///
/// Returns `MalformedReply` when the payload is not valid JSON or is missing
/// a required field; callers substitute a fixed fallback instead of aborting
/// the turn.
pub fn parse_assistant_reply(text: &str) -> ChatResult<StructuredAssistantReply> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| ChatError::MalformedReply(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str =
        r#"{"message":"Here you go","movies":[{"id":"27205","name":"Inception"},{"id":"603","name":"The Matrix"}]}"#;

    #[test]
    fn parses_bare_payload() {
        let reply = parse_assistant_reply(PAYLOAD).unwrap();
        assert_eq!(reply.message, "Here you go");
        assert_eq!(reply.movies.len(), 2);
        assert_eq!(reply.movies[0].id, "27205");
        assert_eq!(reply.movies[0].name, "Inception");
        assert_eq!(reply.movies[1].id, "603");
    }

    #[test]
    fn parses_fenced_payload() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        let reply = parse_assistant_reply(&fenced).unwrap();
        assert_eq!(reply.message, "Here you go");
        assert_eq!(reply.movies.len(), 2);
    }

    #[test]
    fn parses_fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", PAYLOAD);
        assert!(parse_assistant_reply(&fenced).is_ok());
    }

    #[test]
    fn fence_strip_is_idempotent() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        let once = strip_code_fences(&fenced);
        let twice = strip_code_fences(once);
        assert_eq!(once, twice);
        assert_eq!(once, PAYLOAD);
    }

    #[test]
    fn empty_movie_list_is_valid() {
        let reply = parse_assistant_reply(r#"{"message":"Nothing found","movies":[]}"#).unwrap();
        assert!(reply.movies.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_assistant_reply("I could not find any movies, sorry!").unwrap_err();
        assert!(matches!(err, ChatError::MalformedReply(_)));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = parse_assistant_reply(r#"{"message":"no list here"}"#).unwrap_err();
        assert!(matches!(err, ChatError::MalformedReply(_)));
    }
}
