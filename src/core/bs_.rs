/// Decode the `BS_:` bus-configuration line. The payload is kept verbatim;
/// it is usually empty or a bus speed.
pub(crate) fn decode(line: &str) -> String {
    line.trim_start()
        .strip_prefix("BS_:")
        .unwrap_or("")
        .trim()
        .to_string()
}
