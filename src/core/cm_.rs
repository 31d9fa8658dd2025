use crate::core::strings::quoted_payload;
use crate::types::{
    comment::{BusNodeComment, MessageComment, SignalComment},
    errors::ParseError,
};

/// A parsed `CM_` record, routed by its selector sub-kind.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CommentRecord {
    /// Bare `CM_ "...";`, a comment on the database itself.
    Database(String),
    BusNode(BusNodeComment),
    Message(MessageComment),
    Signal(SignalComment),
}

/// Decode a `CM_` line (already accumulated across physical lines when the
/// quoted text spans more than one).
/// Formats:
/// `CM_ "<text>";`
/// `CM_ BU_ <node> "<text>";`
/// `CM_ BO_ <msg-id> "<text>";`
/// `CM_ SG_ <msg-id> <signal> "<text>";`
pub(crate) fn decode(line: &str) -> Result<CommentRecord, ParseError> {
    let malformed = || ParseError::MalformedComment {
        line: line.to_string(),
    };

    let trimmed: &str = line.trim_start().trim_end().trim_end_matches(';');
    let text: String = quoted_payload(trimmed)
        .ok_or_else(|| ParseError::UnterminatedString {
            line: line.to_string(),
        })?
        .to_string();

    // Selector tokens live before the opening quote.
    let head: &str = trimmed.split('"').next().unwrap_or("");
    let mut parts = head.split_ascii_whitespace();
    match parts.next() {
        Some("CM_") => {}
        _ => return Err(malformed()),
    }

    match parts.next() {
        None => Ok(CommentRecord::Database(text)),
        Some("BU_") => {
            let node_name: &str = parts.next().ok_or_else(malformed)?;
            Ok(CommentRecord::BusNode(BusNodeComment {
                node_name: node_name.to_string(),
                comment: text,
            }))
        }
        Some("BO_") => {
            let msg_id: u32 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            Ok(CommentRecord::Message(MessageComment {
                msg_id,
                comment: text,
            }))
        }
        Some("SG_") => {
            let msg_id: u32 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            let signal_name: &str = parts.next().ok_or_else(malformed)?;
            Ok(CommentRecord::Signal(SignalComment {
                msg_id,
                signal_name: signal_name.to_string(),
                comment: text,
            }))
        }
        Some(_) => Err(malformed()),
    }
}
