use std::fmt;

/// Typed attribute definition, built by pairing a `BA_DEF_` record with the
/// optionally present `BA_DEF_DEF_` record of the same name.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDefinition {
    /// Attribute name.
    pub name: String,
    /// Which kind of database object the attribute applies to.
    pub object_type: AttrObjectType,
    /// Declared type, bounds, and optional default.
    pub value: AttrValue,
}

/// The kind of object an attribute definition applies to.
///
/// A bare `BA_DEF_ "..."` record with no object tag declares a
/// database-scoped attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttrObjectType {
    #[default]
    Database,
    Node,
    Message,
    Signal,
}

impl fmt::Display for AttrObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttrObjectType::Database => "Database",
            AttrObjectType::Node => "Node",
            AttrObjectType::Message => "Message",
            AttrObjectType::Signal => "Signal",
        })
    }
}

/// Attribute payload by declared type.
///
/// The DBC token `HEX` parses as `Int`; emission normalizes it to `INT`.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Enum {
        /// Allowed values, in declaration order.
        values: Vec<String>,
        default: Option<String>,
    },
    Float {
        min: f64,
        max: f64,
        default: Option<f64>,
    },
    Int {
        min: i64,
        max: i64,
        default: Option<i64>,
    },
    String {
        default: Option<String>,
    },
}

impl AttrValue {
    /// True when a `BA_DEF_DEF_` default is attached.
    pub fn has_default(&self) -> bool {
        match self {
            AttrValue::Enum { default, .. } => default.is_some(),
            AttrValue::Float { default, .. } => default.is_some(),
            AttrValue::Int { default, .. } => default.is_some(),
            AttrValue::String { default } => default.is_some(),
        }
    }
}
