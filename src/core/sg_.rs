use crate::types::{
    errors::ParseError,
    node::BusNode,
    signal::{Endianness, Signal, Signess},
};

/// Decode a `SG_` line belonging to the current message (the last parsed `BO_`).
/// Format:
/// ` SG_ <name> [M|m<id>] : <start>|<len>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <recv>[,<recv>...]`
pub(crate) fn decode(line: &str) -> Result<Signal, ParseError> {
    let malformed = || ParseError::MalformedSignal {
        line: line.to_string(),
    };

    let trimmed: &str = line.trim_start().trim_end_matches(';');
    let mut split_colon = trimmed.splitn(2, ':');
    let left: &str = split_colon.next().unwrap_or("").trim(); // "SG_ NAME [M|mX]"
    let right: &str = split_colon.next().ok_or_else(malformed)?.trim();

    // Left part: SG_ NAME [M|mX]
    let mut left_it = left.split_ascii_whitespace();
    match left_it.next() {
        Some("SG_") => {}
        _ => return Err(malformed()),
    }
    let name: &str = left_it.next().ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }

    // Multiplexing tag, if present. `M` marks the selector, `m<N>` a signal
    // gated by selector value N; the two forms are mutually exclusive.
    let mut is_multiplex_def: bool = false;
    let mut multiplex_id: Option<u32> = None;
    if let Some(tag) = left_it.next() {
        if tag == "M" {
            is_multiplex_def = true;
        } else if let Some(rest) = tag.strip_prefix('m')
            && let Ok(v) = rest.parse::<u32>()
        {
            multiplex_id = Some(v);
        } else {
            return Err(malformed());
        }
    }

    // Right part: <start>|<len>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
    let mut it = right.split_ascii_whitespace();

    // 1) bit info: "7|16@0-"
    let bit_info: &str = it.next().ok_or_else(malformed)?;
    let mut bit_and_rest = bit_info.split('@');
    let bit_pos_len: &str = bit_and_rest.next().unwrap_or("");
    let es: &str = bit_and_rest.next().ok_or_else(malformed)?;
    let mut pos_len = bit_pos_len.split('|');
    let start_bit: u16 = pos_len
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;
    let bit_length: u16 = pos_len
        .next()
        .and_then(|tok| tok.parse().ok())
        .filter(|len| (1..=64).contains(len))
        .ok_or_else(malformed)?;
    let endianness = match es.chars().next() {
        Some('0') => Endianness::Motorola,
        Some('1') => Endianness::Intel,
        _ => return Err(malformed()),
    };
    let sign = match es.chars().nth(1) {
        Some('+') => Signess::Unsigned,
        Some('-') => Signess::Signed,
        _ => return Err(malformed()),
    };

    // 2) "(factor,offset)" might be split across tokens; gather until ')'
    let paren: &str = it.next().ok_or_else(malformed)?;
    if !paren.starts_with('(') {
        return Err(malformed());
    }
    let mut acc = String::from(paren);
    while !acc.ends_with(')') {
        match it.next() {
            Some(tok) => {
                acc.push(' ');
                acc.push_str(tok);
            }
            None => return Err(malformed()),
        }
    }
    let inner: &str = acc.trim_start_matches('(').trim_end_matches(')');
    let mut nums = inner.split(',').map(|s| s.trim());
    let factor: f64 = nums
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;
    let offset: f64 = nums
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;

    // 3) "[min|max]"
    let bounds: &str = it.next().ok_or_else(malformed)?;
    if !bounds.starts_with('[') {
        return Err(malformed());
    }
    let mut acc = String::from(bounds);
    while !acc.ends_with(']') {
        match it.next() {
            Some(tok) => {
                acc.push(' ');
                acc.push_str(tok);
            }
            None => return Err(malformed()),
        }
    }
    let inner: &str = acc.trim_start_matches('[').trim_end_matches(']');
    let mut nums = inner.split('|').map(|s| s.trim());
    let min: f64 = nums
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;
    let max: f64 = nums
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;

    // 4) quoted unit, possibly containing spaces
    let unit_token: &str = it.next().ok_or_else(malformed)?;
    if !unit_token.starts_with('"') {
        return Err(malformed());
    }
    let mut acc = String::from(unit_token);
    while acc.len() < 2 || !acc.ends_with('"') {
        match it.next() {
            Some(tok) => {
                acc.push(' ');
                acc.push_str(tok);
            }
            None => return Err(malformed()),
        }
    }
    let unit: String = acc.trim_matches('"').to_string();

    // 5) receivers, comma-separated (sometimes with spaces after the commas).
    // The sentinel Vector__XXX means "none".
    let mut receiver_nodes: Vec<BusNode> = Vec::new();
    for token in it {
        for node_name in token.split(',') {
            let node_name = node_name.trim();
            if !node_name.is_empty() && node_name != "Vector__XXX" {
                receiver_nodes.push(BusNode::named(node_name));
            }
        }
    }

    let mut sig = Signal {
        name: name.to_string(),
        is_multiplex_def,
        multiplex_id,
        start_bit,
        bit_length,
        endianness,
        sign,
        factor,
        offset,
        min,
        max,
        unit,
        receiver_nodes,
        ..Default::default()
    };
    sig.compile_inline();
    Ok(sig)
}
