use crate::core::{ba_def_def_, strings::collect_all_quoted};
use crate::types::{
    attributes::{AttrObjectType, AttrValue, AttributeDefinition},
    errors::ParseError,
};

/// Extract the attribute name from a `BA_DEF_` line during the streaming
/// pass. The full definition is decoded later, once its optional
/// `BA_DEF_DEF_` default is known.
pub(crate) fn scan(line: &str) -> Result<String, ParseError> {
    collect_all_quoted(line)
        .into_iter()
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::MalformedAttributeDefinition {
            line: line.to_string(),
        })
}

/// Decode a `BA_DEF_` line paired with its optional `BA_DEF_DEF_` line into
/// a typed attribute definition.
/// Formats:
/// `BA_DEF_ [BU_|BO_|SG_] "<name>" INT <min> <max>;` (`HEX` is treated as `INT`)
/// `BA_DEF_ [BU_|BO_|SG_] "<name>" FLOAT <min> <max>;`
/// `BA_DEF_ [BU_|BO_|SG_] "<name>" STRING;`
/// `BA_DEF_ [BU_|BO_|SG_] "<name>" ENUM "v1","v2",...;`
pub(crate) fn decode(
    line: &str,
    default_line: Option<&str>,
) -> Result<AttributeDefinition, ParseError> {
    let malformed = || ParseError::MalformedAttributeDefinition {
        line: line.to_string(),
    };

    let s: &str = line.trim().trim_end_matches(';').trim_end();
    let s: &str = s.strip_prefix("BA_DEF_").ok_or_else(malformed)?;
    let s: &str = s.trim_start();

    let (object_type, s) = if let Some(rest) = s.strip_prefix("BU_ ") {
        (AttrObjectType::Node, rest)
    } else if let Some(rest) = s.strip_prefix("BO_ ") {
        (AttrObjectType::Message, rest)
    } else if let Some(rest) = s.strip_prefix("SG_ ") {
        (AttrObjectType::Signal, rest)
    } else {
        (AttrObjectType::Database, s)
    };

    let s: &str = s.trim_start().strip_prefix('"').ok_or_else(malformed)?;
    let (name, s) = s.split_once('"').ok_or_else(malformed)?;
    let s: &str = s.trim_start();

    let default_literal: Option<String> = match default_line {
        Some(def_line) => Some(ba_def_def_::literal_of(def_line)?),
        None => None,
    };

    let mut parts = s.split_ascii_whitespace();
    let value: AttrValue = match parts.next().ok_or_else(malformed)? {
        "STRING" => AttrValue::String {
            default: parse_string_default(default_line.unwrap_or(line), default_literal)?,
        },
        "INT" | "HEX" => {
            let min: i64 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            let max: i64 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            let default: Option<i64> = match default_literal {
                Some(lit) => Some(lit.parse().map_err(|_| {
                    ParseError::MalformedAttributeDefault {
                        line: default_line.unwrap_or("").to_string(),
                    }
                })?),
                None => None,
            };
            AttrValue::Int { min, max, default }
        }
        "FLOAT" => {
            let min: f64 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            let max: f64 = parts
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(malformed)?;
            let default: Option<f64> = match default_literal {
                Some(lit) => Some(lit.parse().map_err(|_| {
                    ParseError::MalformedAttributeDefault {
                        line: default_line.unwrap_or("").to_string(),
                    }
                })?),
                None => None,
            };
            AttrValue::Float { min, max, default }
        }
        "ENUM" => AttrValue::Enum {
            values: collect_all_quoted(s),
            default: parse_string_default(default_line.unwrap_or(line), default_literal)?,
        },
        _ => return Err(malformed()),
    };

    Ok(AttributeDefinition {
        name: name.to_string(),
        object_type,
        value,
    })
}

// String/Enum defaults come quoted; strip the quotes, keep the text.
fn parse_string_default(
    line: &str,
    default_literal: Option<String>,
) -> Result<Option<String>, ParseError> {
    match default_literal {
        Some(lit) => {
            let lit = lit.trim();
            if lit.starts_with('"') && lit.ends_with('"') && lit.len() >= 2 {
                Ok(Some(lit[1..lit.len() - 1].to_string()))
            } else {
                Err(ParseError::MalformedAttributeDefault {
                    line: line.to_string(),
                })
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_enum_with_default() {
        let def = decode(
            r#"BA_DEF_ SG_ "SigType" ENUM "normal","diag","calib";"#,
            Some(r#"BA_DEF_DEF_ "SigType" "normal";"#),
        )
        .unwrap();
        assert_eq!(def.name, "SigType");
        assert_eq!(def.object_type, AttrObjectType::Signal);
        assert_eq!(
            def.value,
            AttrValue::Enum {
                values: vec![
                    "normal".to_string(),
                    "diag".to_string(),
                    "calib".to_string()
                ],
                default: Some("normal".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_hex_is_int() {
        let def = decode(r#"BA_DEF_ "NmBaseAddress" HEX 0 536870911;"#, None).unwrap();
        assert_eq!(def.object_type, AttrObjectType::Database);
        assert_eq!(
            def.value,
            AttrValue::Int {
                min: 0,
                max: 536870911,
                default: None,
            }
        );
    }

    #[test]
    fn test_decode_int_with_default() {
        let def = decode(
            r#"BA_DEF_ BO_ "GenMsgCycleTime" INT 0 10000;"#,
            Some(r#"BA_DEF_DEF_ "GenMsgCycleTime" 100;"#),
        )
        .unwrap();
        assert_eq!(def.object_type, AttrObjectType::Message);
        assert_eq!(
            def.value,
            AttrValue::Int {
                min: 0,
                max: 10000,
                default: Some(100),
            }
        );
    }

    #[test]
    fn test_decode_float_and_string() {
        let def = decode(
            r#"BA_DEF_ BU_ "NodeWeight" FLOAT 0 1.5;"#,
            Some(r#"BA_DEF_DEF_ "NodeWeight" 0.25;"#),
        )
        .unwrap();
        assert_eq!(def.object_type, AttrObjectType::Node);
        assert_eq!(
            def.value,
            AttrValue::Float {
                min: 0.0,
                max: 1.5,
                default: Some(0.25),
            }
        );

        let def = decode(r#"BA_DEF_ "DBName" STRING;"#, None).unwrap();
        assert_eq!(def.value, AttrValue::String { default: None });
    }

    #[test]
    fn test_decode_rejects_unquoted_string_default() {
        assert!(
            decode(
                r#"BA_DEF_ "DBName" STRING;"#,
                Some(r#"BA_DEF_DEF_ "DBName" Unquoted;"#),
            )
            .is_err()
        );
    }

    #[test]
    fn test_scan() {
        assert_eq!(
            scan(r#"BA_DEF_ SG_ "SigType" ENUM "a","b";"#).unwrap(),
            "SigType"
        );
        assert!(scan("BA_DEF_ SG_ ENUM").is_err());
    }
}
