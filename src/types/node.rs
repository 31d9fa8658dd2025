use std::collections::BTreeMap;

/// Node/ECU attached to the bus.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct BusNode {
    /// Node/ECU name.
    pub name: String,
    /// Associated comment (DBC `CM_ BU_` section).
    pub comment: Option<String>,
    /// Attribute assignments (DBC `BA_ ... BU_` section), raw literal text.
    pub attributes: BTreeMap<String, String>,
}

impl BusNode {
    /// Creates a node carrying only a name, as used for transmitter and
    /// receiver references inside messages and signals.
    pub fn named(name: &str) -> Self {
        BusNode {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = BusNode::default();
    }
}
