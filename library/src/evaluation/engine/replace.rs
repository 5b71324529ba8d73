//! Hot replacement of a node implementation with explicit state transfer.

use log::{info, warn};

use super::Engine;
use crate::error::EngineError;
use crate::evaluation::fault::EvaluationFault;
use crate::model::connection::{Connection, PortId};
use crate::model::node::NodeId;
use crate::plugin::traits::Node;

/// What a replacement could not carry over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Connections that referenced ports the replacement no longer declares.
    pub removed_connections: Vec<Connection>,
    /// Fields held by the old node that the replacement does not declare.
    pub dropped_fields: Vec<String>,
    /// Signals of output ports that no longer exist.
    pub dropped_signals: Vec<PortId>,
}

impl Engine {
    /// Swap the implementation behind `node_id`, keeping its id and name.
    ///
    /// The replacement must be of the same node type. Properties and persisted
    /// fields are copied over by name; a field the replacement rejects is
    /// dropped with a warning. Then the replacement's init hook runs. If the
    /// init hook fails, nothing in the graph is changed.
    /// Connections and signals that refer to ports the replacement no longer
    /// declares are removed; everything else stays in place.
    pub fn replace_node(
        &mut self,
        node_id: NodeId,
        mut replacement: Box<dyn Node>,
    ) -> Result<ReplaceReport, EngineError> {
        let instance = self
            .graph
            .node(node_id)
            .ok_or(EngineError::UnknownNode(node_id))?;
        let expected = instance.type_id().to_string();
        let found = replacement.definition().type_id.clone();
        if expected != found {
            return Err(EngineError::IncompatibleReplacement {
                node_id,
                expected,
                found,
            });
        }

        let mut report = ReplaceReport::default();
        let old_definition = std::sync::Arc::clone(instance.definition());
        let new_definition = std::sync::Arc::clone(replacement.definition());

        for name in old_definition.transferable_fields() {
            let Some(value) = instance.node.field(name) else {
                continue;
            };
            if !new_definition.declares_field(name) {
                warn!(
                    "Replacing {}: field '{}' is no longer declared, dropping it",
                    node_id, name
                );
                report.dropped_fields.push(name.to_string());
                continue;
            }
            if let Err(error) = replacement.set_field(name, value) {
                warn!("Replacing {}: could not copy field '{}': {}", node_id, name, error);
                report.dropped_fields.push(name.to_string());
            }
        }
        if let Err(error) = replacement.on_added() {
            return Err(EvaluationFault::new(node_id, &instance.name, error).into());
        }
        let name = instance.name.clone();

        report.removed_connections = self
            .graph
            .connections_for(node_id)
            .into_iter()
            .filter(|c| {
                let output_gone =
                    c.from.node_id == node_id && new_definition.output(&c.from.port).is_none();
                let input_gone =
                    c.to.node_id == node_id && new_definition.input(&c.to.port).is_none();
                output_gone || input_gone
            })
            .collect();
        for conn in &report.removed_connections {
            self.graph.remove_connection(conn);
            warn!("Replacing {}: removed connection {}", node_id, conn);
        }

        report.dropped_signals = self
            .signals
            .keys_for(node_id)
            .into_iter()
            .filter(|key| new_definition.output(&key.port).is_none())
            .collect();
        for key in &report.dropped_signals {
            self.signals.remove(key);
        }

        self.graph.swap_node(node_id, replacement)?;
        info!(
            "Replaced node {} '{}' ({} connections removed, {} fields dropped)",
            node_id,
            name,
            report.removed_connections.len(),
            report.dropped_fields.len()
        );
        Ok(report)
    }
}
