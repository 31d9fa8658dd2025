use crate::types::database::Database;

/// Decode the `BU_:` line listing node names and register them in order.
/// Example: `BU_: ECU1 ECU2 ECU3`
pub(crate) fn decode(db: &mut Database, line: &str) {
    let mut parts = line.split_ascii_whitespace();
    let first: Option<&str> = parts.next();
    if first != Some("BU_:") && first != Some("BU_") {
        return;
    }

    for name in parts {
        let name = name.trim();
        if !name.is_empty() {
            db.add_node_if_absent(name);
        }
    }
}
