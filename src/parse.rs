//! DBC text → [`Database`] parsing.
//!
//! The reader streams the input line by line, decodes Windows-1252, and
//! classifies each line by its leading preamble. Records that reference other
//! objects (comments, attribute defaults, value tables, attribute values) are
//! staged during the streaming pass and attached to their owners in a second
//! resolution pass, once every referenced object exists.

use crate::core;
use crate::core::{
    ba_::{AttributeTarget, PendingAttribute},
    cm_::CommentRecord,
    val_::PendingValueTable,
};
use crate::types::comment::{BusNodeComment, MessageComment, SignalComment};
use crate::types::database::Database;
use crate::types::errors::{DbcReadError, ParseError};
use crate::types::message::Message;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};

use encoding_rs::WINDOWS_1252;

/// Parses a DBC file and returns a populated [`Database`] instance.
///
/// The file is read as raw bytes and decoded as Windows-1252, the encoding
/// Vector tools write. The file handle is scoped to this call and released
/// on all exit paths.
///
/// # Errors
/// - [`DbcReadError::Open`] / [`DbcReadError::Read`] for I/O failures.
/// - [`DbcReadError::Parse`] when a line matching a known preamble fails
///   structural validation; the partially built database is discarded.
///
/// # Example
/// ```no_run
/// let db = dbc_tools::parse::from_file("example.dbc").expect("Failed to parse DBC file");
/// println!("Parsed {} messages", db.messages.len());
/// ```
pub fn from_file(path: &str) -> Result<Database, DbcReadError> {
    let file: File = File::open(path).map_err(|source| DbcReadError::Open {
        path: path.to_string(),
        source,
    })?;
    from_reader(BufReader::new(file))
}

/// Parses DBC content from a pre-opened stream.
///
/// The stream is consumed to EOF and decoded as Windows-1252. Streams this
/// function did not open are never closed beyond being dropped by the caller.
pub fn from_reader<R: Read>(mut reader: R) -> Result<Database, DbcReadError> {
    let mut bytes: Vec<u8> = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DbcReadError::Read { source })?;

    let (text, _, _) = WINDOWS_1252.decode(&bytes);
    Ok(from_dbc_text(&text)?)
}

/// Parses DBC content already held in memory.
pub fn from_dbc_text(text: &str) -> Result<Database, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let mut db: Database = Database::default();
    let mut staging: Staging = Staging::default();
    let mut version_found = false;
    let mut bus_config_found = false;
    let mut bus_nodes_found = false;
    let mut i: usize = 0;

    while i < lines.len() {
        let line: &str = lines[i];

        // Empty lines and tab-prefixed continuation lines (the NS_ block and
        // other unsupported records) carry no supported payload.
        if line.is_empty() || line.starts_with('\t') {
            i += 1;
            continue;
        }

        let preamble: &str = line.split_ascii_whitespace().next().unwrap_or("");

        match preamble {
            "VERSION" if !version_found => {
                db.version = core::version::decode(line);
                version_found = true;
            }
            "BS_:" if !bus_config_found => {
                db.bus_config = core::bs_::decode(line);
                bus_config_found = true;
            }
            "BU_:" | "BU_" if !bus_nodes_found => {
                core::bu_::decode(&mut db, line);
                bus_nodes_found = true;
            }
            "BO_" => {
                staging.flush_current(&mut db);
                staging.current_msg = Some(core::bo_::decode(line)?);
            }
            "SG_" => {
                let Some(msg) = staging.current_msg.as_mut() else {
                    return Err(ParseError::SignalOutsideMessage {
                        line: line.to_string(),
                    });
                };
                let sig = core::sg_::decode(line)?;
                if msg.signals.contains_key(&sig.name) {
                    return Err(ParseError::DuplicateSignal {
                        message: msg.name.clone(),
                        signal: sig.name,
                    });
                }
                msg.signals.insert(sig.name.clone(), sig);
            }
            "CM_" => {
                staging.flush_current(&mut db);
                // The quoted text may span several physical lines.
                let full: String = gather_comment(&lines, &mut i)?;
                match core::cm_::decode(&full)? {
                    CommentRecord::Database(text) => db.comment = Some(text),
                    CommentRecord::BusNode(c) => staging.node_comments.push(c),
                    CommentRecord::Message(c) => staging.message_comments.push(c),
                    CommentRecord::Signal(c) => staging.signal_comments.push(c),
                }
            }
            "VAL_" => {
                staging.flush_current(&mut db);
                staging.value_tables.push(core::val_::decode(line)?);
            }
            "BA_DEF_" => {
                staging.flush_current(&mut db);
                let name: String = core::ba_def_::scan(line)?;
                staging.push_attr_def(name, line);
            }
            "BA_DEF_DEF_" => {
                staging.flush_current(&mut db);
                let name: String = core::ba_def_def_::name_of(line)?;
                staging.attr_default_lines.insert(name, line.to_string());
            }
            "BA_" => {
                staging.flush_current(&mut db);
                staging.attributes.push(core::ba_::decode(line)?);
            }
            // Unknown preambles are not an error.
            _ => {}
        }

        i += 1;
    }

    // Just in case we still have a message open
    staging.flush_current(&mut db);

    resolve(&mut db, staging)?;
    Ok(db)
}

// Accumulate physical lines until the CM_ quoted segment closes.
fn gather_comment(lines: &[&str], i: &mut usize) -> Result<String, ParseError> {
    let mut full: String = lines[*i].to_string();
    while !core::strings::has_complete_quoted_segment(&full) {
        if *i + 1 >= lines.len() {
            return Err(ParseError::UnterminatedString { line: full });
        }
        *i += 1;
        full.push('\n');
        full.push_str(lines[*i].trim());
    }
    Ok(full)
}

/// Records staged during the streaming pass, resolved once the whole input
/// has been consumed.
#[derive(Default)]
struct Staging {
    current_msg: Option<Message>,
    node_comments: Vec<BusNodeComment>,
    message_comments: Vec<MessageComment>,
    signal_comments: Vec<SignalComment>,
    // Definition lines in declaration order, unique by name.
    attr_def_lines: Vec<(String, String)>,
    attr_default_lines: HashMap<String, String>,
    value_tables: Vec<PendingValueTable>,
    attributes: Vec<PendingAttribute>,
}

impl Staging {
    // Close the active message context and hand the message to the database,
    // which applies the CAN ID filter.
    fn flush_current(&mut self, db: &mut Database) {
        if let Some(msg) = self.current_msg.take() {
            db.insert_message(msg);
        }
    }

    // A redefinition replaces the earlier entry in place.
    fn push_attr_def(&mut self, name: String, line: &str) {
        if let Some(entry) = self.attr_def_lines.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = line.to_string();
        } else {
            self.attr_def_lines.push((name, line.to_string()));
        }
    }
}

// Second pass: attach staged records to their owning entities. Unresolved
// comment, value-table and attribute targets are dropped silently; malformed
// attribute definitions still abort.
fn resolve(db: &mut Database, staging: Staging) -> Result<(), ParseError> {
    for c in staging.node_comments {
        if let Some(node) = db.get_node_by_name_mut(&c.node_name) {
            node.comment = Some(c.comment);
        }
    }

    for c in staging.message_comments {
        if let Some(msg) = db.messages.get_mut(&c.msg_id) {
            msg.comment = Some(c.comment);
        }
    }

    for c in staging.signal_comments {
        if let Some(sig) = db
            .messages
            .get_mut(&c.msg_id)
            .and_then(|m| m.signals.get_mut(&c.signal_name))
        {
            sig.comment = Some(c.comment);
        }
    }

    for (name, line) in &staging.attr_def_lines {
        let default_line: Option<&str> = staging.attr_default_lines.get(name).map(String::as_str);
        db.attribute_definitions
            .push(core::ba_def_::decode(line, default_line)?);
    }

    for table in staging.value_tables {
        if let Some(sig) = db
            .messages
            .get_mut(&table.msg_id)
            .and_then(|m| m.signals.get_mut(&table.signal_name))
        {
            for (value, label) in table.entries {
                sig.value_descriptions.insert(value, label);
            }
        }
    }

    for attr in staging.attributes {
        match attr.target {
            AttributeTarget::Database => {
                db.attributes.insert(attr.name, attr.raw_value);
            }
            AttributeTarget::Node { node } => {
                if let Some(n) = db.get_node_by_name_mut(&node) {
                    n.attributes.insert(attr.name, attr.raw_value);
                }
            }
            AttributeTarget::Message { msg_id } => {
                if let Some(m) = db.messages.get_mut(&msg_id) {
                    m.attributes.insert(attr.name, attr.raw_value);
                }
            }
            AttributeTarget::Signal { msg_id, signal } => {
                if let Some(s) = db
                    .messages
                    .get_mut(&msg_id)
                    .and_then(|m| m.signals.get_mut(&signal))
                {
                    s.attributes.insert(attr.name, attr.raw_value);
                }
            }
        }
    }

    Ok(())
}
