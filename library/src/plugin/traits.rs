//! The node capability interface consumed by the engine.

use std::sync::Arc;

use anyhow::bail;

use crate::model::value::Value;
use crate::plugin::node_types::NodeTypeDefinition;

/// Behaviour of a single node instance.
///
/// The engine only talks to a node through this interface: it sets inputs,
/// calls [`Node::evaluate`], and reads outputs back. Everything else the node
/// holds (properties, learned state) is private to it, except for the named
/// fields exposed through [`Node::field`] / [`Node::set_field`] so that state
/// can be carried over when the node is replaced.
pub trait Node: Send {
    fn definition(&self) -> &Arc<NodeTypeDefinition>;

    /// Set an input port. `None` clears the port.
    fn set_input(&mut self, port: &str, value: Option<Value>);

    /// Current value held on an input port.
    fn input(&self, port: &str) -> Option<Value>;

    /// Current value held on an output port.
    fn output(&self, port: &str) -> Option<Value>;

    /// The node's compute step. Reads its own inputs and writes its own
    /// outputs. Absent inputs are the node's to handle, usually by doing
    /// nothing.
    fn evaluate(&mut self) -> anyhow::Result<()>;

    /// Display fields, in declaration order.
    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        Vec::new()
    }

    /// Read a property or persisted field by name.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Write a property or persisted field by name.
    fn set_field(&mut self, name: &str, _value: Value) -> anyhow::Result<()> {
        bail!("node type '{}' has no field '{}'", self.definition().type_id, name)
    }

    /// Called once after the node is placed in the graph (or replaces another).
    fn on_added(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Run a named action declared in the type definition.
    fn run_action(&mut self, name: &str) -> anyhow::Result<()> {
        bail!("node type '{}' has no action '{}'", self.definition().type_id, name)
    }
}

/// Port storage shared by node implementations.
///
/// Slots are indexed through the name tables of the type definition, so
/// lookups never scan port lists.
#[derive(Debug, Clone)]
pub struct PortState {
    definition: Arc<NodeTypeDefinition>,
    inputs: Vec<Option<Value>>,
    outputs: Vec<Option<Value>>,
}

impl PortState {
    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        let inputs = vec![None; definition.inputs.len()];
        let outputs = vec![None; definition.outputs.len()];
        Self {
            definition,
            inputs,
            outputs,
        }
    }

    pub fn definition(&self) -> &Arc<NodeTypeDefinition> {
        &self.definition
    }

    pub fn input(&self, port: &str) -> Option<&Value> {
        let slot = self.definition.input_slot(port)?;
        self.inputs[slot].as_ref()
    }

    pub fn set_input(&mut self, port: &str, value: Option<Value>) {
        if let Some(slot) = self.definition.input_slot(port) {
            self.inputs[slot] = value;
        }
    }

    pub fn output(&self, port: &str) -> Option<&Value> {
        let slot = self.definition.output_slot(port)?;
        self.outputs[slot].as_ref()
    }

    pub fn set_output(&mut self, port: &str, value: Option<Value>) {
        if let Some(slot) = self.definition.output_slot(port) {
            self.outputs[slot] = value;
        }
    }
}
