//! # dbc_tools
//!
//! Rust utilities for working with **automotive CAN** databases in the
//! textual DBC format produced by Vector CANdb++.
//!
//! ## Highlights
//! - DBC parser: loads CAN databases from `.dbc` files or pre-opened streams
//!   into a [`Database`](crate::types::database::Database). The reader streams
//!   the input line by line, decodes Windows-1252, stages cross-referencing
//!   records (comments, attribute defaults, value tables) and attaches them
//!   to their owners in a second resolution pass.
//! - DBC writer: emits a database back out in the canonical record order;
//!   re-parsing the generated text yields an equal database.
//! - Signal transcoder: bit-level decode/encode of signal values over a
//!   message payload, honoring endianness, bit position, length, sign, and
//!   scaling, with multiplex gating.
//!
pub(crate) mod core;
pub mod parse;
pub mod save;
pub mod transcode;
pub mod types;

pub use crate::transcode::{DecodedMessage, DecodedSignal, EncodedMessage, MessageTranscoder};
pub use crate::types::attributes::{AttrObjectType, AttrValue, AttributeDefinition};
pub use crate::types::database::{Database, MAX_CAN_ID};
pub use crate::types::errors::{
    DbcReadError, DbcWriteError, ParseError, TranscodeError, TranscodeErrorKind,
};
pub use crate::types::message::Message;
pub use crate::types::node::BusNode;
pub use crate::types::signal::{Endianness, Signal, Signess};
