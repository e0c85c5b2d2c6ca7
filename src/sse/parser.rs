//! Line-level parsing of the chat stream.

use crate::error::StreamError;

use super::events::{RecordPayload, StreamEvent};

/// Literal prefix of a record line.
pub const DATA_PREFIX: &str = "data: ";

/// Represents a parsed stream line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine<'a> {
    /// Record payload following `data: `
    Data(&'a str),
    /// Blank keep-alive line, comment, or any other field
    Ignored,
}

/// Classify a single line. A trailing `\r` is not part of the line.
pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) => SseLine::Data(payload),
        None => SseLine::Ignored,
    }
}

/// Decode a record payload into its [`StreamEvent`]s.
///
/// Invalid JSON and payloads with no recognised field are reported as
/// [`StreamError::MalformedRecord`]. A successful parse is never empty.
pub fn parse_record(payload: &str) -> Result<Vec<StreamEvent>, StreamError> {
    let record: RecordPayload =
        serde_json::from_str(payload).map_err(|e| StreamError::MalformedRecord {
            line: payload.to_string(),
            reason: e.to_string(),
        })?;

    let events = record.into_events();
    if events.is_empty() {
        return Err(StreamError::MalformedRecord {
            line: payload.to_string(),
            reason: "no token, done or error field".to_string(),
        });
    }
    Ok(events)
}

/// Parse one complete line, dropping anything that is not a usable record.
pub fn parse_line(line: &str) -> Vec<StreamEvent> {
    match parse_sse_line(line) {
        SseLine::Data(payload) => parse_record(payload).unwrap_or_else(|err| {
            tracing::debug!("Dropping stream record: {}", err);
            Vec::new()
        }),
        SseLine::Ignored => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_line() {
        assert_eq!(
            parse_sse_line(r#"data: {"token":"a"}"#),
            SseLine::Data(r#"{"token":"a"}"#)
        );
    }

    #[test]
    fn test_parse_data_line_with_crlf() {
        assert_eq!(
            parse_sse_line("data: {\"token\":\"a\"}\r"),
            SseLine::Data(r#"{"token":"a"}"#)
        );
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        assert_eq!(parse_sse_line(""), SseLine::Ignored);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Ignored);
        assert_eq!(parse_sse_line("event: message"), SseLine::Ignored);
        // Prefix requires the space
        assert_eq!(parse_sse_line(r#"data:{"token":"a"}"#), SseLine::Ignored);
        assert_eq!(parse_sse_line(r#" data: {"token":"a"}"#), SseLine::Ignored);
    }

    #[test]
    fn test_parse_record_invalid_json() {
        let err = parse_record(r#"{"token": "unterminated"#).unwrap_err();
        assert!(matches!(err, StreamError::MalformedRecord { .. }));
    }

    #[test]
    fn test_parse_record_unrecognised_object() {
        let err = parse_record(r#"{"status":"thinking"}"#).unwrap_err();
        match err {
            StreamError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("no token"));
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_record_non_object_json() {
        assert!(parse_record("[1,2,3]").is_err());
        assert!(parse_record("\"token\"").is_err());
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line(r#"data: {"token":"Hi"}"#),
            vec![StreamEvent::Token("Hi".to_string())]
        );
        assert!(parse_line("data: not json").is_empty());
        assert!(parse_line(r#"{"token":"Hi"}"#).is_empty());
    }

    #[test]
    fn test_parse_line_token_and_done() {
        let events = parse_line(r#"data: {"token":"fin","done":true,"sources":[]}"#);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Token("fin".to_string()));
        assert!(events[1].is_terminal());
    }
}
