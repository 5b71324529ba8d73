use std::sync::Arc;

use super::{field, inp, node};
use crate::model::connection::PortDataType;
use crate::model::value::Value;
use crate::plugin::node_types::{NodeCategory, NodeTypeDefinition};
use crate::plugin::registry::NodeTypeRegistry;
use crate::plugin::traits::{Node, PortState};

pub(super) fn register(registry: &mut NodeTypeRegistry) {
    registry.register(Display::definition(), |def| Box::new(Display::new(def)));
}

/// Sink that shows whatever arrives on its input.
pub struct Display {
    ports: PortState,
    shown: Option<Value>,
}

impl Display {
    pub const TYPE_ID: &'static str = "utility.display";

    pub fn definition() -> NodeTypeDefinition {
        node(Self::TYPE_ID, "Display", NodeCategory::Utility)
            .with_inputs(vec![inp("in", "Input", PortDataType::Any)])
            .with_displays(vec![field("value", "Value")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
            shown: None,
        }
    }
}

impl Node for Display {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        self.shown = self.ports.input("in").cloned();
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("value".to_string(), self.shown.clone())]
    }
}
