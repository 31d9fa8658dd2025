use crate::types::errors::ParseError;

/// Target selector of a `BA_` attribute assignment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum AttributeTarget {
    Database,
    Node { node: String },
    Message { msg_id: u32 },
    Signal { msg_id: u32, signal: String },
}

/// Attribute assignment waiting to be attached to its owning entity by the
/// resolver. The value is kept as raw literal text, quotes included, and
/// re-emitted verbatim.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingAttribute {
    pub(crate) name: String,
    pub(crate) target: AttributeTarget,
    pub(crate) raw_value: String,
}

// First whitespace-delimited token of `s`, plus the remainder with original
// spacing intact.
fn take_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

/// Decode a `BA_` line.
/// Formats:
/// `BA_ "<name>" <value>;`
/// `BA_ "<name>" BU_ <node> <value>;`
/// `BA_ "<name>" BO_ <msg-id> <value>;`
/// `BA_ "<name>" SG_ <msg-id> <signal> <value>;`
pub(crate) fn decode(line: &str) -> Result<PendingAttribute, ParseError> {
    let malformed = || ParseError::MalformedAttributeValue {
        line: line.to_string(),
    };

    let s: &str = line.trim().trim_end_matches(';').trim_end();
    let s: &str = s.strip_prefix("BA_").ok_or_else(malformed)?;
    let s: &str = s.trim_start().strip_prefix('"').ok_or_else(malformed)?;
    let (name, after_name) = s.split_once('"').ok_or_else(malformed)?;

    let (selector, rest) = take_token(after_name);
    let (target, raw_value): (AttributeTarget, &str) = match selector {
        "BU_" => {
            let (node, rest) = take_token(rest);
            if node.is_empty() {
                return Err(malformed());
            }
            (
                AttributeTarget::Node {
                    node: node.to_string(),
                },
                rest,
            )
        }
        "BO_" => {
            let (id_tok, rest) = take_token(rest);
            let msg_id: u32 = id_tok.parse().map_err(|_| malformed())?;
            (AttributeTarget::Message { msg_id }, rest)
        }
        "SG_" => {
            let (id_tok, rest) = take_token(rest);
            let msg_id: u32 = id_tok.parse().map_err(|_| malformed())?;
            let (signal, rest) = take_token(rest);
            if signal.is_empty() {
                return Err(malformed());
            }
            (
                AttributeTarget::Signal {
                    msg_id,
                    signal: signal.to_string(),
                },
                rest,
            )
        }
        // No object tag: a database-scoped assignment whose value starts here.
        _ => (AttributeTarget::Database, after_name),
    };

    let raw_value: &str = raw_value.trim();
    if raw_value.is_empty() {
        return Err(malformed());
    }

    Ok(PendingAttribute {
        name: name.to_string(),
        target,
        raw_value: raw_value.to_string(),
    })
}
