/// Decode the `VERSION` line, quotes stripped.
/// Example: `VERSION "1.0.2"`
pub(crate) fn decode(line: &str) -> String {
    line.trim_start()
        .strip_prefix("VERSION")
        .unwrap_or("")
        .trim()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(decode(r#"VERSION "1.0.2""#), "1.0.2");
        assert_eq!(decode(r#"VERSION  "1.0""#), "1.0");
        assert_eq!(decode("VERSION \"\""), "");
    }
}
