//! [`Database`] → DBC text generation.
//!
//! Records are emitted in the canonical DBC order: version, the fixed `NS_ :`
//! keyword block, bus configuration, nodes, messages with their signals,
//! comments, attribute definitions (each followed by its default), attribute
//! assignments, and value tables. Re-parsing the generated text yields an
//! equal database.

use std::fmt::{self, Write as FmtWrite};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::types::{
    attributes::{AttrObjectType, AttrValue},
    database::Database,
    errors::DbcWriteError,
    signal::{Endianness, Signal, Signess},
};

// The canonical NS_ keyword list written by Vector tools. Records of these
// kinds are not round-tripped; only the header block is reproduced.
const NS_KEYWORDS: &[&str] = &[
    "NS_DESC_",
    "CM_",
    "BA_DEF_",
    "BA_",
    "VAL_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "BA_DEF_DEF_",
    "EV_DATA_",
    "ENVVAR_DATA_",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "BA_DEF_SGTYPE_",
    "BA_SGTYPE_",
    "SIG_TYPE_REF_",
    "VAL_TABLE_",
    "SIG_GROUP_",
    "SIG_VALTYPE_",
    "SIGTYPE_VALTYPE_",
    "BO_TX_BU_",
    "BA_DEF_REL_",
    "BA_REL_",
    "BA_DEF_DEF_REL_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
    "SG_MUL_VAL_",
];

/// Serializes a [`Database`] into DBC text and writes it to `path`.
pub fn to_file(path: &str, database: &Database) -> Result<(), DbcWriteError> {
    let serialized: String = serialize_database(database)?;

    let file: File = File::create(path).map_err(|source| DbcWriteError::Create {
        path: path.to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(serialized.as_bytes())
        .map_err(|source| DbcWriteError::Write { source })?;
    writer
        .flush()
        .map_err(|source| DbcWriteError::Write { source })?;
    Ok(())
}

/// Serializes a [`Database`] into DBC text and writes it to a pre-opened
/// stream. The stream is flushed but never closed here.
pub fn to_writer<W: Write>(mut writer: W, database: &Database) -> Result<(), DbcWriteError> {
    let serialized: String = serialize_database(database)?;

    writer
        .write_all(serialized.as_bytes())
        .map_err(|source| DbcWriteError::Write { source })?;
    writer
        .flush()
        .map_err(|source| DbcWriteError::Write { source })?;
    Ok(())
}

/// Serializes a [`Database`] into DBC text.
pub fn serialize_database(db: &Database) -> Result<String, DbcWriteError> {
    let mut out = String::new();

    write_fmt(&mut out, format_args!("VERSION \"{}\"\n\n", db.version))?;

    out.push_str("NS_ :\n");
    for keyword in NS_KEYWORDS {
        out.push('\t');
        out.push_str(keyword);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("BS_:");
    if !db.bus_config.is_empty() {
        out.push(' ');
        out.push_str(&db.bus_config);
    }
    out.push_str("\n\n");

    out.push_str("BU_:");
    for node in &db.bus_nodes {
        out.push(' ');
        out.push_str(&node.name);
    }
    out.push_str("\n\n");

    write_messages(db, &mut out)?;
    write_comments(db, &mut out)?;
    write_attribute_definitions(db, &mut out)?;
    write_attribute_assignments(db, &mut out)?;
    write_value_tables(db, &mut out)?;

    Ok(out)
}

fn write_messages(db: &Database, out: &mut String) -> Result<(), DbcWriteError> {
    for message in db.messages.values() {
        let transmitter: &str = if message.transmitting_node.name.is_empty() {
            "Vector__XXX"
        } else {
            &message.transmitting_node.name
        };

        write_fmt(
            out,
            format_args!(
                "BO_ {} {}: {} {}\n",
                message.id, message.name, message.dlc, transmitter
            ),
        )?;

        for signal in message.signals.values() {
            let mux_tag: String = format_mux_tag(signal);
            let endian: char = if matches!(signal.endianness, Endianness::Intel) {
                '1'
            } else {
                '0'
            };
            let sign_char: char = match signal.sign {
                Signess::Signed => '-',
                Signess::Unsigned => '+',
            };
            let receivers: Vec<&str> = signal
                .receiver_nodes
                .iter()
                .map(|node| node.name.as_str())
                .collect();
            let receivers_field: String = if receivers.is_empty() {
                "Vector__XXX".to_string()
            } else {
                receivers.join(",")
            };

            write_fmt(
                out,
                format_args!(
                    " SG_ {}{} : {}|{}@{}{} ({},{}) [{}|{}] \"{}\" {}\n",
                    signal.name,
                    mux_tag,
                    signal.start_bit,
                    signal.bit_length,
                    endian,
                    sign_char,
                    format_f64(signal.factor),
                    format_f64(signal.offset),
                    format_f64(signal.min),
                    format_f64(signal.max),
                    signal.unit,
                    receivers_field
                ),
            )?;
        }

        out.push('\n');
    }

    Ok(())
}

fn write_comments(db: &Database, out: &mut String) -> Result<(), DbcWriteError> {
    let mut wrote = false;

    if let Some(comment) = &db.comment {
        write_fmt(out, format_args!("CM_ \"{}\";\n", comment))?;
        wrote = true;
    }

    for node in &db.bus_nodes {
        if let Some(comment) = &node.comment {
            write_fmt(
                out,
                format_args!("CM_ BU_ {} \"{}\";\n", node.name, comment),
            )?;
            wrote = true;
        }
    }

    for message in db.messages.values() {
        if let Some(comment) = &message.comment {
            write_fmt(
                out,
                format_args!("CM_ BO_ {} \"{}\";\n", message.id, comment),
            )?;
            wrote = true;
        }
    }

    for message in db.messages.values() {
        for signal in message.signals.values() {
            if let Some(comment) = &signal.comment {
                write_fmt(
                    out,
                    format_args!("CM_ SG_ {} {} \"{}\";\n", message.id, signal.name, comment),
                )?;
                wrote = true;
            }
        }
    }

    if wrote {
        out.push('\n');
    }
    Ok(())
}

fn write_attribute_definitions(db: &Database, out: &mut String) -> Result<(), DbcWriteError> {
    let mut wrote = false;

    for def in &db.attribute_definitions {
        let scope: &str = match def.object_type {
            AttrObjectType::Database => "",
            AttrObjectType::Node => "BU_ ",
            AttrObjectType::Message => "BO_ ",
            AttrObjectType::Signal => "SG_ ",
        };
        let signature: String = format_attribute_payload(&def.value);
        write_fmt(
            out,
            format_args!("BA_DEF_ {}\"{}\" {};\n", scope, def.name, signature),
        )?;
        wrote = true;

        // The default follows its definition, formatted per the declared
        // type: quoted for Enum/String, a bare number for Int/Float.
        match &def.value {
            AttrValue::Enum {
                default: Some(default),
                ..
            }
            | AttrValue::String {
                default: Some(default),
            } => {
                write_fmt(
                    out,
                    format_args!("BA_DEF_DEF_ \"{}\" \"{}\";\n", def.name, default),
                )?;
            }
            AttrValue::Int {
                default: Some(default),
                ..
            } => {
                write_fmt(
                    out,
                    format_args!("BA_DEF_DEF_ \"{}\" {};\n", def.name, default),
                )?;
            }
            AttrValue::Float {
                default: Some(default),
                ..
            } => {
                write_fmt(
                    out,
                    format_args!("BA_DEF_DEF_ \"{}\" {};\n", def.name, format_f64(*default)),
                )?;
            }
            _ => {}
        }
    }

    if wrote {
        out.push('\n');
    }
    Ok(())
}

fn write_attribute_assignments(db: &Database, out: &mut String) -> Result<(), DbcWriteError> {
    let mut wrote = false;

    for (name, value) in &db.attributes {
        write_fmt(out, format_args!("BA_ \"{}\" {};\n", name, value))?;
        wrote = true;
    }

    for node in &db.bus_nodes {
        for (name, value) in &node.attributes {
            write_fmt(
                out,
                format_args!("BA_ \"{}\" BU_ {} {};\n", name, node.name, value),
            )?;
            wrote = true;
        }
    }

    for message in db.messages.values() {
        for (name, value) in &message.attributes {
            write_fmt(
                out,
                format_args!("BA_ \"{}\" BO_ {} {};\n", name, message.id, value),
            )?;
            wrote = true;
        }
    }

    for message in db.messages.values() {
        for signal in message.signals.values() {
            for (name, value) in &signal.attributes {
                write_fmt(
                    out,
                    format_args!(
                        "BA_ \"{}\" SG_ {} {} {};\n",
                        name, message.id, signal.name, value
                    ),
                )?;
                wrote = true;
            }
        }
    }

    if wrote {
        out.push('\n');
    }
    Ok(())
}

fn write_value_tables(db: &Database, out: &mut String) -> Result<(), DbcWriteError> {
    for message in db.messages.values() {
        for signal in message.signals.values() {
            if signal.value_descriptions.is_empty() {
                continue;
            }
            write_fmt(out, format_args!("VAL_ {} {}", message.id, signal.name))?;
            for (value, label) in &signal.value_descriptions {
                write_fmt(out, format_args!(" {} \"{}\"", value, label))?;
            }
            out.push_str(" ;\n");
        }
    }

    Ok(())
}

fn format_mux_tag(signal: &Signal) -> String {
    if signal.is_multiplex_def {
        " M".to_string()
    } else if let Some(id) = signal.multiplex_id {
        format!(" m{}", id)
    } else {
        String::new()
    }
}

fn format_attribute_payload(value: &AttrValue) -> String {
    match value {
        AttrValue::String { .. } => "STRING".to_string(),
        AttrValue::Int { min, max, .. } => format!("INT {} {}", min, max),
        AttrValue::Float { min, max, .. } => {
            format!("FLOAT {} {}", format_f64(*min), format_f64(*max))
        }
        AttrValue::Enum { values, .. } => {
            let joined: String = values
                .iter()
                .map(|value| format!("\"{}\"", value))
                .collect::<Vec<_>>()
                .join(",");
            format!("ENUM {}", joined)
        }
    }
}

// Shortest form that re-parses to the same f64; Rust's Display guarantees it.
fn format_f64(value: f64) -> String {
    value.to_string()
}

fn write_fmt(out: &mut String, args: fmt::Arguments<'_>) -> Result<(), DbcWriteError> {
    out.write_fmt(args).map_err(|_| DbcWriteError::Format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const ROUNDTRIP_DBC: &str = r#"VERSION "0.3"

BS_: 500000

BU_: PACMOD CUSTOMER_ECU

BO_ 1045 OCCUPANCY_RPT: 2 PACMOD
 SG_ VEHICLE_SPEED : 7|16@0- (0.01,0) [-327.68|327.67] "m/s" CUSTOMER_ECU
 SG_ BELT_STATUS : 8|1@1+ (1,0) [0|1] "" Vector__XXX

BO_ 708 GEAR_CMD: 8 CUSTOMER_ECU
 SG_ GEAR_MUX M : 0|8@1+ (1,0) [0|255] "" PACMOD
 SG_ GEAR_TARGET m0 : 8|8@1+ (1,0) [0|255] "" PACMOD

CM_ "Test network";
CM_ BU_ PACMOD "Drive-by-wire controller.";
CM_ BO_ 1045 "Occupancy report.";
CM_ SG_ 1045 VEHICLE_SPEED "Speed in meters per second; signed.";

BA_DEF_ SG_ "SigType" ENUM "normal","diag","calib";
BA_DEF_ BO_ "GenMsgCycleTime" INT 0 10000;
BA_DEF_ "DBName" STRING;
BA_DEF_DEF_ "SigType" "normal";
BA_DEF_DEF_ "GenMsgCycleTime" 100;

BA_ "DBName" "TestCAN";
BA_ "GenMsgCycleTime" BO_ 1045 50;
BA_ "SigType" SG_ 1045 VEHICLE_SPEED "diag";

VAL_ 1045 BELT_STATUS 1 "Fastened" 0 "Unfastened" ;
"#;

    #[test]
    fn test_roundtrip_preserves_model() {
        let db = parse::from_dbc_text(ROUNDTRIP_DBC).expect("Failed to parse DBC");
        let emitted = serialize_database(&db).expect("Failed to serialize DBC");
        let reparsed = parse::from_dbc_text(&emitted).expect("Failed to re-parse emitted DBC");
        assert_eq!(db, reparsed);
    }

    #[test]
    fn test_emitted_text_is_stable() {
        // A second emit of the re-parsed model reproduces the text exactly.
        let db = parse::from_dbc_text(ROUNDTRIP_DBC).unwrap();
        let first = serialize_database(&db).unwrap();
        let second = serialize_database(&parse::from_dbc_text(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_emission_sections() {
        let db = parse::from_dbc_text(ROUNDTRIP_DBC).unwrap();
        let emitted = serialize_database(&db).unwrap();

        assert!(emitted.starts_with("VERSION \"0.3\"\n\nNS_ :\n\tNS_DESC_\n"));
        assert!(emitted.contains("\nBS_: 500000\n"));
        assert!(emitted.contains("\nBU_: PACMOD CUSTOMER_ECU\n"));
        assert!(emitted.contains("BO_ 1045 OCCUPANCY_RPT: 2 PACMOD\n"));
        assert!(
            emitted
                .contains(" SG_ VEHICLE_SPEED : 7|16@0- (0.01,0) [-327.68|327.67] \"m/s\" CUSTOMER_ECU\n")
        );
        assert!(emitted.contains(" SG_ BELT_STATUS : 8|1@1+ (1,0) [0|1] \"\" Vector__XXX\n"));
        assert!(emitted.contains(" SG_ GEAR_MUX M : 0|8@1+ (1,0) [0|255] \"\" PACMOD\n"));
        assert!(emitted.contains(" SG_ GEAR_TARGET m0 : 8|8@1+ (1,0) [0|255] \"\" PACMOD\n"));
        assert!(emitted.contains("CM_ \"Test network\";\n"));
        assert!(emitted.contains("CM_ SG_ 1045 VEHICLE_SPEED \"Speed in meters per second; signed.\";\n"));
        assert!(emitted.contains("BA_DEF_ SG_ \"SigType\" ENUM \"normal\",\"diag\",\"calib\";\n"));
        assert!(emitted.contains("BA_DEF_DEF_ \"SigType\" \"normal\";\n"));
        assert!(emitted.contains("BA_DEF_DEF_ \"GenMsgCycleTime\" 100;\n"));
        assert!(emitted.contains("BA_ \"DBName\" \"TestCAN\";\n"));
        assert!(emitted.contains("BA_ \"SigType\" SG_ 1045 VEHICLE_SPEED \"diag\";\n"));
        assert!(emitted.contains("VAL_ 1045 BELT_STATUS 0 \"Unfastened\" 1 \"Fastened\" ;\n"));
    }

    #[test]
    fn test_hex_definition_normalizes_to_int() {
        let text = "BA_DEF_ \"NmBaseAddress\" HEX 0 536870911;\n";
        let db = parse::from_dbc_text(text).unwrap();
        let emitted = serialize_database(&db).unwrap();
        assert!(emitted.contains("BA_DEF_ \"NmBaseAddress\" INT 0 536870911;\n"));
        assert!(!emitted.contains("HEX"));
    }

    #[test]
    fn test_to_file_and_back() {
        let db = parse::from_dbc_text(ROUNDTRIP_DBC).unwrap();
        let tmp_path = std::env::temp_dir().join("dbc_tools_save_test.dbc");
        to_file(tmp_path.to_str().unwrap(), &db).expect("Failed to save DBC");

        let reparsed = parse::from_file(tmp_path.to_str().unwrap()).unwrap();
        assert_eq!(db, reparsed);
    }
}
