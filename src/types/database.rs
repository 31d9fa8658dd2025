//! Database model.
//!
//! This module defines the in-memory **CAN database** filled by the DBC
//! parser. Nodes keep their source order; messages are keyed by CAN ID;
//! attribute definitions keep their declaration order. All containers own
//! their contents, so `clone()` yields a fully independent, equal graph.

use crate::types::{attributes::AttributeDefinition, message::Message, node::BusNode};
use std::collections::BTreeMap;

/// Highest CAN ID representable on the wire (29 bits).
///
/// Vector tools emit diagnostic pseudo-messages above this range; the parser
/// drops them at insertion time.
pub const MAX_CAN_ID: u32 = 0x1FFF_FFFF;

/// In-memory representation of a CAN database (DBC).
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Database {
    /// Version string (`VERSION` line, quotes stripped).
    pub version: String,
    /// Raw payload of the `BS_:` line (usually empty or a bus speed).
    pub bus_config: String,
    /// Nodes in source order (`BU_:` line).
    pub bus_nodes: Vec<BusNode>,
    /// Messages keyed by CAN ID.
    pub messages: BTreeMap<u32, Message>,
    /// Attribute definitions in declaration order. Names are unique.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Database-level comment (bare `CM_` record).
    pub comment: Option<String>,
    /// Database-scoped attribute assignments, raw literal text.
    pub attributes: BTreeMap<String, String>,
}

impl Database {
    /// Returns a `&BusNode` given its name.
    pub fn get_node_by_name(&self, name: &str) -> Option<&BusNode> {
        self.bus_nodes.iter().find(|node| node.name == name)
    }

    /// Returns a `&mut BusNode` given its name.
    pub fn get_node_by_name_mut(&mut self, name: &str) -> Option<&mut BusNode> {
        self.bus_nodes.iter_mut().find(|node| node.name == name)
    }

    /// Returns a `&Message` given its numeric CAN ID.
    pub fn get_message_by_id(&self, id: u32) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Returns a `&mut Message` given its numeric CAN ID.
    pub fn get_message_by_id_mut(&mut self, id: u32) -> Option<&mut Message> {
        self.messages.get_mut(&id)
    }

    /// Returns a `&Message` given its name.
    pub fn get_message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.values().find(|msg| msg.name == name)
    }

    /// Returns an attribute definition given its name.
    pub fn get_attribute_definition(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attribute_definitions
            .iter()
            .find(|def| def.name == name)
    }

    /// Adds a node to the database if not already present.
    pub fn add_node_if_absent(&mut self, name: &str) {
        if self.get_node_by_name(name).is_none() {
            self.bus_nodes.push(BusNode::named(name));
        }
    }

    // Applies the CAN ID filter and first-wins duplicate policy used by the
    // parser when a finished message is flushed.
    pub(crate) fn insert_message(&mut self, msg: Message) {
        if msg.id <= MAX_CAN_ID {
            self.messages.entry(msg.id).or_insert(msg);
        }
    }

    /// Clears the database.
    pub fn clear(&mut self) {
        *self = Database::default();
    }
}
