use crate::types::errors::ParseError;

/// Value table waiting to be merged into its target signal by the resolver.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingValueTable {
    pub(crate) msg_id: u32,
    pub(crate) signal_name: String,
    pub(crate) entries: Vec<(u32, String)>,
}

/// Decode a `VAL_` line.
/// Format: `VAL_ <msg-id> <signal> <int> "<label>" <int> "<label>" ... ;`
pub(crate) fn decode(line: &str) -> Result<PendingValueTable, ParseError> {
    let malformed = || ParseError::MalformedValueTable {
        line: line.to_string(),
    };

    let trimmed: &str = line.trim().trim_end_matches(';').trim_end();

    // Labels may contain spaces, so split at the quotes: even segments are
    // outside quoted text, odd segments are the labels themselves.
    let segs: Vec<&str> = trimmed.split('"').collect();
    if segs.len() % 2 == 0 {
        return Err(ParseError::UnterminatedString {
            line: line.to_string(),
        });
    }

    let mut head = segs[0].split_ascii_whitespace();
    match head.next() {
        Some("VAL_") => {}
        _ => return Err(malformed()),
    }
    let msg_id: u32 = head
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(malformed)?;
    let signal_name: String = head.next().ok_or_else(malformed)?.to_string();

    // Each label is preceded by its numeric value in the outside segment.
    let mut entries: Vec<(u32, String)> = Vec::new();
    let mut pending_value: Option<u32> = match head.next() {
        Some(tok) => Some(tok.parse().map_err(|_| malformed())?),
        None => None,
    };

    for chunk in segs[1..].chunks(2) {
        let label: &str = chunk[0];
        let value: u32 = pending_value.take().ok_or_else(malformed)?;
        entries.push((value, label.to_string()));

        if let Some(outside) = chunk.get(1) {
            pending_value = match outside.split_ascii_whitespace().next() {
                Some(tok) => Some(tok.parse().map_err(|_| malformed())?),
                None => None,
            };
        }
    }

    // A dangling value with no label is malformed.
    if pending_value.is_some() {
        return Err(malformed());
    }

    Ok(PendingValueTable {
        msg_id,
        signal_name,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let table = decode(r#"VAL_ 1045 Status 1 "On" 0 "Off" ;"#).unwrap();
        assert_eq!(table.msg_id, 1045);
        assert_eq!(table.signal_name, "Status");
        assert_eq!(
            table.entries,
            vec![(1, "On".to_string()), (0, "Off".to_string())]
        );
    }

    #[test]
    fn test_decode_labels_with_spaces() {
        let table = decode(r#"VAL_ 1045 Overheat 1 "Overheat failure" 0 "No Overheat";"#).unwrap();
        assert_eq!(
            table.entries,
            vec![
                (1, "Overheat failure".to_string()),
                (0, "No Overheat".to_string())
            ]
        );
    }

    #[test]
    fn test_decode_rejects_dangling_value() {
        assert!(decode(r#"VAL_ 1045 Status 1 "On" 0 ;"#).is_err());
    }

    #[test]
    fn test_decode_rejects_unbalanced_quotes() {
        let err = decode(r#"VAL_ 1045 Status 1 "On ;"#).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
    }
}
