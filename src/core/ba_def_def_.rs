use crate::core::strings::collect_all_quoted;
use crate::types::errors::ParseError;

/// Extract the attribute name from a `BA_DEF_DEF_` line during the streaming
/// pass, so the default can be paired with its definition by name.
/// Format: `BA_DEF_DEF_ "<name>" <literal>;`
pub(crate) fn name_of(line: &str) -> Result<String, ParseError> {
    collect_all_quoted(line)
        .into_iter()
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::MalformedAttributeDefault {
            line: line.to_string(),
        })
}

/// The raw default literal: everything after the quoted name, semicolon
/// stripped. Quoted for Enum/String, a bare number for Int/Float; the typed
/// interpretation happens when the paired definition is decoded.
pub(crate) fn literal_of(line: &str) -> Result<String, ParseError> {
    let malformed = || ParseError::MalformedAttributeDefault {
        line: line.to_string(),
    };

    let s: &str = line.trim().trim_end_matches(';').trim_end();
    let s: &str = s.strip_prefix("BA_DEF_DEF_").ok_or_else(malformed)?;
    let s: &str = s.trim_start().strip_prefix('"').ok_or_else(malformed)?;
    let (_name, rest) = s.split_once('"').ok_or_else(malformed)?;

    let literal: &str = rest.trim();
    if literal.is_empty() {
        return Err(malformed());
    }
    Ok(literal.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_of() {
        assert_eq!(name_of(r#"BA_DEF_DEF_ "SigType" "normal";"#).unwrap(), "SigType");
        assert!(name_of("BA_DEF_DEF_ 5;").is_err());
    }

    #[test]
    fn test_literal_of() {
        assert_eq!(
            literal_of(r#"BA_DEF_DEF_ "SigType" "normal";"#).unwrap(),
            r#""normal""#
        );
        assert_eq!(
            literal_of(r#"BA_DEF_DEF_  "GenMsgCycleTime" 100;"#).unwrap(),
            "100"
        );
        assert!(literal_of(r#"BA_DEF_DEF_ "NoValue";"#).is_err());
    }
}
