//! Graph registry: the node set and the connection set.
//!
//! Pure data structure. Ordering and evaluation live in [`analysis`] and the
//! engine; the registry only validates references and owns lifetimes.

pub mod analysis;

use std::collections::BTreeMap;

use log::debug;

use crate::error::EngineError;
use crate::model::connection::{Connection, PortId};
use crate::model::node::{NodeId, NodeInstance};
use crate::plugin::traits::Node;

#[derive(Debug, Default)]
pub struct GraphRegistry {
    /// Keyed by id; ids are allocated in increasing order, so iteration order
    /// is insertion order.
    nodes: BTreeMap<NodeId, NodeInstance>,
    connections: Vec<Connection>,
    next_id: u64,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its type's display name.
    pub fn add_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let name = node.definition().display_name.clone();
        self.add_named_node(&name, node)
    }

    /// Register a node with an explicit display name.
    pub fn add_named_node(&mut self, name: &str, node: Box<dyn Node>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        debug!("GraphRegistry: added {} '{}' ({})", id, name, node.definition().type_id);
        self.nodes.insert(
            id,
            NodeInstance {
                id,
                name: name.to_string(),
                node,
            },
        );
        id
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<NodeInstance, EngineError> {
        let instance = self.nodes.remove(&id).ok_or(EngineError::UnknownNode(id))?;
        self.connections.retain(|c| !c.touches(id));
        debug!("GraphRegistry: removed {}", id);
        Ok(instance)
    }

    /// Add a connection. Returns `Ok(false)` if an identical one already exists.
    ///
    /// Both endpoints must exist and name declared ports (output on the source,
    /// input on the destination). The one-connection-per-input rule is the
    /// caller's to enforce.
    pub fn add_connection(&mut self, conn: Connection) -> Result<bool, EngineError> {
        self.validate_endpoints(&conn)?;
        if self.connections.contains(&conn) {
            return Ok(false);
        }
        debug!("GraphRegistry: connected {}", conn);
        self.connections.push(conn);
        Ok(true)
    }

    /// Remove a connection. Returns `false` if it was not present.
    pub fn remove_connection(&mut self, conn: &Connection) -> bool {
        match self.connections.iter().position(|c| c == conn) {
            Some(index) => {
                self.connections.remove(index);
                debug!("GraphRegistry: disconnected {}", conn);
                true
            }
            None => false,
        }
    }

    /// All connections with `id` as source or destination.
    pub fn connections_for(&self, id: NodeId) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|c| c.touches(id))
            .cloned()
            .collect()
    }

    /// Connections feeding a given input port, in registration order.
    pub fn connections_into<'a>(
        &'a self,
        input: &'a PortId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| &c.to == input)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, NodeInstance> {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInstance> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeInstance> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Put a new implementation behind an existing id, returning the old one.
    pub(crate) fn swap_node(
        &mut self,
        id: NodeId,
        node: Box<dyn Node>,
    ) -> Result<Box<dyn Node>, EngineError> {
        let instance = self.nodes.get_mut(&id).ok_or(EngineError::UnknownNode(id))?;
        Ok(std::mem::replace(&mut instance.node, node))
    }

    fn validate_endpoints(&self, conn: &Connection) -> Result<(), EngineError> {
        let source = self
            .node(conn.from.node_id)
            .ok_or(EngineError::UnknownNode(conn.from.node_id))?;
        let target = self
            .node(conn.to.node_id)
            .ok_or(EngineError::UnknownNode(conn.to.node_id))?;
        if source.definition().output(&conn.from.port).is_none() {
            return Err(EngineError::UnknownPort {
                node_id: conn.from.node_id,
                port: conn.from.port.clone(),
            });
        }
        if target.definition().input(&conn.to.port).is_none() {
            return Err(EngineError::UnknownPort {
                node_id: conn.to.node_id,
                port: conn.to.port.clone(),
            });
        }
        Ok(())
    }
}
