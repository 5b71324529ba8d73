//! Node instances held by the graph registry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::plugin::node_types::NodeTypeDefinition;
use crate::plugin::traits::Node;

/// Registry-assigned node identity. Allocated monotonically, never reused
/// within one engine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node placed in the graph: identity, display name and the node's own
/// implementation (which owns all of its field storage).
pub struct NodeInstance {
    pub id: NodeId,
    pub name: String,
    pub node: Box<dyn Node>,
}

impl NodeInstance {
    pub fn definition(&self) -> &Arc<NodeTypeDefinition> {
        self.node.definition()
    }

    pub fn type_id(&self) -> &str {
        &self.node.definition().type_id
    }
}

impl fmt::Debug for NodeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_id", &self.type_id())
            .finish()
    }
}
