//! Connection model for the data-flow graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Data type for a port.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDataType {
    /// Floating point scalar
    Number,
    /// Integer scalar
    Integer,
    /// Boolean value
    Boolean,
    /// Text string
    Text,
    /// 1D array
    Vector,
    /// 2D array
    Matrix,
    /// Accepts any type (generic)
    Any,
}

impl PortDataType {
    /// Whether an output of type `self` may feed an input of type `input`.
    pub fn feeds(self, input: PortDataType) -> bool {
        self == PortDataType::Any
            || input == PortDataType::Any
            || self == input
            || (self == PortDataType::Integer && input == PortDataType::Number)
    }
}

/// Definition of a port on a node type.
#[derive(Clone, Debug)]
pub struct PortDefinition {
    /// Internal name used for connections (e.g. "in", "out")
    pub name: String,
    /// Display name shown in the editor (e.g. "Input")
    pub display_name: String,
    pub data_type: PortDataType,
}

impl PortDefinition {
    pub fn new(name: &str, display_name: &str, data_type: PortDataType) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            data_type,
        }
    }
}

/// Identifies a specific port on a specific node.
///
/// For output ports this is also the key of the signal store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    pub node_id: NodeId,
    pub port: String,
}

impl PortId {
    pub fn new(node_id: NodeId, port: &str) -> Self {
        Self {
            node_id,
            port: port.to_string(),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.port)
    }
}

/// Key of the signal store: (producing node, output port).
pub type SignalKey = PortId;

/// A connection between two ports (an edge in the data-flow graph).
///
/// Connections have no identity beyond their endpoints; two connections with
/// the same endpoints are the same connection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Source port (output)
    pub from: PortId,
    /// Destination port (input)
    pub to: PortId,
}

impl Connection {
    pub fn new(from: PortId, to: PortId) -> Self {
        Self { from, to }
    }

    /// Shorthand for `Connection::new(PortId::new(..), PortId::new(..))`.
    pub fn between(from_node: NodeId, from_port: &str, to_node: NodeId, to_port: &str) -> Self {
        Self {
            from: PortId::new(from_node, from_port),
            to: PortId::new(to_node, to_port),
        }
    }

    /// True if `node_id` is either endpoint.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.from.node_id == node_id || self.to.node_id == node_id
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
