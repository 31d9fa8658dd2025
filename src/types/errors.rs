use std::io;
use thiserror::Error;

/// Errors produced while reading a DBC source into a
/// [`Database`](crate::types::database::Database).
#[derive(Debug, Error)]
pub enum DbcReadError {
    #[error("Failed to open '{path}'. \nError: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading DBC input. \nError: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors produced while writing a [`Database`](crate::types::database::Database)
/// out as DBC text.
#[derive(Debug, Error)]
pub enum DbcWriteError {
    #[error("Failed to create '{path}'. \nError: {source}")]
    Create {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing DBC output. \nError: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
    #[error("Failed to format DBC content")]
    Format,
}

/// Structural failures on lines that matched a known record preamble.
///
/// The first parse failure aborts the whole parse; the partially built
/// database is discarded. Unknown preambles and unresolved comment targets
/// are not errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed message header: {line}")]
    MalformedMessage { line: String },
    #[error("Malformed signal definition: {line}")]
    MalformedSignal { line: String },
    #[error("Signal definition outside of any message: {line}")]
    SignalOutsideMessage { line: String },
    #[error("Signal '{signal}' defined twice in message '{message}'")]
    DuplicateSignal { message: String, signal: String },
    #[error("Unterminated quoted string: {line}")]
    UnterminatedString { line: String },
    #[error("Malformed comment: {line}")]
    MalformedComment { line: String },
    #[error("Malformed attribute definition: {line}")]
    MalformedAttributeDefinition { line: String },
    #[error("Malformed attribute default: {line}")]
    MalformedAttributeDefault { line: String },
    #[error("Malformed attribute value: {line}")]
    MalformedAttributeValue { line: String },
    #[error("Malformed value table: {line}")]
    MalformedValueTable { line: String },
}

/// Error kinds reported by the signal transcoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeErrorKind {
    OutOfRange,
    SelectorMismatch,
    ShortPayload,
    UnknownSignal,
}

/// Errors produced while decoding or encoding signal values over a payload.
///
/// Transcode errors never abort a whole-message operation; they are collected
/// out of band so callers can keep the best-effort results.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TranscodeError {
    #[error("Signal '{signal}': physical value {physical} is outside the {bit_length}-bit raw range")]
    OutOfRange {
        signal: String,
        physical: f64,
        bit_length: u16,
    },
    #[error("Signal '{signal}' is gated by multiplex id {expected} but the selector reads {actual}")]
    SelectorMismatch {
        signal: String,
        expected: u32,
        actual: u64,
    },
    #[error("Signal '{signal}' needs {needed} payload bytes but only {available} are present")]
    ShortPayload {
        signal: String,
        needed: usize,
        available: usize,
    },
    #[error("Message '{message}' does not define a signal named '{signal}'")]
    UnknownSignal { message: String, signal: String },
}

impl TranscodeError {
    pub fn kind(&self) -> TranscodeErrorKind {
        match self {
            TranscodeError::OutOfRange { .. } => TranscodeErrorKind::OutOfRange,
            TranscodeError::SelectorMismatch { .. } => TranscodeErrorKind::SelectorMismatch,
            TranscodeError::ShortPayload { .. } => TranscodeErrorKind::ShortPayload,
            TranscodeError::UnknownSignal { .. } => TranscodeErrorKind::UnknownSignal,
        }
    }
}
