//! Editor operations: structural and property edits followed by the minimal
//! propagation each one needs.

use std::collections::BTreeSet;

use log::{debug, info};

use super::Engine;
use crate::error::EngineError;
use crate::evaluation::fault::EvaluationFault;
use crate::model::connection::Connection;
use crate::model::node::NodeId;
use crate::model::value::Value;
use crate::plugin::traits::Node;

impl Engine {
    /// Place a new node, run its init hook, and probe it so generators publish
    /// their first output.
    ///
    /// If the init hook fails, the node is not placed.
    pub fn insert_node(
        &mut self,
        name: Option<&str>,
        node: Box<dyn Node>,
    ) -> Result<NodeId, EngineError> {
        let id = match name {
            Some(name) => self.graph.add_named_node(name, node),
            None => self.graph.add_node(node),
        };
        let instance = self.graph.node_mut(id).ok_or(EngineError::UnknownNode(id))?;
        if let Err(error) = instance.node.on_added() {
            let fault = EvaluationFault::new(id, &instance.name, error);
            self.graph.remove_node(id)?;
            return Err(fault.into());
        }
        info!("Inserted node {} '{}'", id, instance.name);
        self.propagate_from_node(id, true);
        Ok(id)
    }

    /// Remove a node with its connections and its signals. Downstream nodes
    /// are re-probed so they notice their now-absent inputs.
    pub fn delete_node(&mut self, node_id: NodeId) -> Result<BTreeSet<NodeId>, EngineError> {
        let downstream: Vec<NodeId> = self
            .graph
            .connections()
            .iter()
            .filter(|c| c.from.node_id == node_id && c.to.node_id != node_id)
            .map(|c| c.to.node_id)
            .collect();
        let removed = self.graph.remove_node(node_id)?;
        self.signals.remove_node(node_id);
        info!("Deleted node {} '{}'", node_id, removed.name);

        let mut updated = BTreeSet::new();
        for target in downstream {
            updated.extend(self.propagate_from_node(target, true));
        }
        Ok(updated)
    }

    /// Connect an output to an input, replacing whatever fed that input.
    ///
    /// The replaced connection's stale source signal is dropped, then the
    /// target is re-probed along with everything downstream of it.
    pub fn connect(&mut self, conn: Connection) -> Result<BTreeSet<NodeId>, EngineError> {
        self.check_port_types(&conn)?;
        if self.graph.connections().contains(&conn) {
            return Err(EngineError::DuplicateConnection(conn));
        }

        let existing: Vec<Connection> = self.graph.connections_into(&conn.to).cloned().collect();
        for old in existing {
            self.graph.remove_connection(&old);
            self.signals.remove(&old.from);
            debug!("Replaced connection {}", old);
        }

        self.graph.add_connection(conn.clone())?;
        Ok(self.propagate_from_node(conn.to.node_id, true))
    }

    /// Remove a connection and clear the input it fed.
    pub fn disconnect(&mut self, conn: &Connection) -> Result<BTreeSet<NodeId>, EngineError> {
        if !self.graph.remove_connection(conn) {
            return Err(EngineError::ConnectionNotFound(conn.clone()));
        }
        if let Some(target) = self.graph.node_mut(conn.to.node_id) {
            target.node.set_input(&conn.to.port, None);
        }
        self.signals.remove(&conn.from);
        Ok(self.propagate_from_node(conn.to.node_id, false))
    }

    /// Change a user-tunable property and re-probe the node and its consumers.
    pub fn set_property(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: Value,
    ) -> Result<BTreeSet<NodeId>, EngineError> {
        let instance = self
            .graph
            .node_mut(node_id)
            .ok_or(EngineError::UnknownNode(node_id))?;
        if !instance.definition().has_property(name) {
            return Err(EngineError::UnknownField {
                node_id,
                field: name.to_string(),
            });
        }
        instance
            .node
            .set_field(name, value)
            .map_err(|e| EngineError::InvalidArgument(format!("{}.{}: {}", node_id, name, e)))?;
        Ok(self.propagate_from_node(node_id, true))
    }

    /// Run a declared action on a node, then re-probe it and its consumers.
    ///
    /// A failing action is reported as a fault of that node; it does not stop
    /// the engine.
    pub fn run_action(
        &mut self,
        node_id: NodeId,
        name: &str,
    ) -> Result<BTreeSet<NodeId>, EngineError> {
        let instance = self
            .graph
            .node_mut(node_id)
            .ok_or(EngineError::UnknownNode(node_id))?;
        if !instance.definition().has_action(name) {
            return Err(EngineError::UnknownField {
                node_id,
                field: name.to_string(),
            });
        }
        if let Err(error) = instance.node.run_action(name) {
            return Err(EvaluationFault::new(node_id, &instance.name, error).into());
        }
        info!("Ran action '{}' on {}", name, node_id);
        Ok(self.propagate_from_node(node_id, true))
    }

    fn check_port_types(&self, conn: &Connection) -> Result<(), EngineError> {
        let source = self
            .graph
            .node(conn.from.node_id)
            .ok_or(EngineError::UnknownNode(conn.from.node_id))?;
        let target = self
            .graph
            .node(conn.to.node_id)
            .ok_or(EngineError::UnknownNode(conn.to.node_id))?;
        let from = source
            .definition()
            .output(&conn.from.port)
            .ok_or_else(|| EngineError::UnknownPort {
                node_id: conn.from.node_id,
                port: conn.from.port.clone(),
            })?
            .data_type;
        let to = target
            .definition()
            .input(&conn.to.port)
            .ok_or_else(|| EngineError::UnknownPort {
                node_id: conn.to.node_id,
                port: conn.to.port.clone(),
            })?
            .data_type;
        if !from.feeds(to) {
            return Err(EngineError::IncompatiblePorts { from, to });
        }
        Ok(())
    }
}
