use crate::types::{errors::ParseError, message::Message, node::BusNode};

/// Decode a `BO_` message header. The returned message becomes the context
/// for subsequent `SG_` lines.
/// Format: `BO_ <id> <name>: <dlc> <transmitter>`
pub(crate) fn decode(line: &str) -> Result<Message, ParseError> {
    let malformed = || ParseError::MalformedMessage {
        line: line.to_string(),
    };

    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BO_") => {}
        _ => return Err(malformed()),
    }

    let id: u32 = parts
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;

    // The name usually carries the trailing colon; tolerate a detached one.
    let name_token: &str = parts.next().ok_or_else(malformed)?;
    let name: &str = name_token.trim_end_matches(':');
    if name.is_empty() {
        return Err(malformed());
    }

    let mut dlc_token: &str = parts.next().ok_or_else(malformed)?;
    if dlc_token == ":" {
        dlc_token = parts.next().ok_or_else(malformed)?;
    }
    let dlc: u8 = dlc_token.parse().ok().filter(|d| *d <= 15).ok_or_else(malformed)?;

    let transmitter: &str = parts.next().ok_or_else(malformed)?;

    Ok(Message {
        id,
        name: name.to_string(),
        dlc,
        transmitting_node: BusNode::named(transmitter),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let msg = decode("BO_ 1045 OCCUPANCY_RPT: 2 PACMOD").unwrap();
        assert_eq!(msg.id, 0x415);
        assert_eq!(msg.name, "OCCUPANCY_RPT");
        assert_eq!(msg.dlc, 2);
        assert_eq!(msg.transmitting_node.name, "PACMOD");
        assert!(msg.signals.is_empty());
    }

    #[test]
    fn test_decode_detached_colon() {
        let msg = decode("BO_ 708 ZV_04 : 8 Gateway").unwrap();
        assert_eq!(msg.name, "ZV_04");
        assert_eq!(msg.dlc, 8);
    }

    #[test]
    fn test_decode_rejects_bad_dlc() {
        assert!(decode("BO_ 1045 OCCUPANCY_RPT: 16 PACMOD").is_err());
        assert!(decode("BO_ 1045 OCCUPANCY_RPT: x PACMOD").is_err());
    }

    #[test]
    fn test_decode_rejects_truncated() {
        assert!(decode("BO_ 1045 OCCUPANCY_RPT: 2").is_err());
        assert!(decode("BO_ abc NAME: 2 PACMOD").is_err());
    }
}
