use std::sync::Arc;

use anyhow::{anyhow, bail};

use super::{field, inp, node, out, prop};
use crate::model::connection::PortDataType;
use crate::model::value::Value;
use crate::plugin::node_types::{NodeCategory, NodeTypeDefinition};
use crate::plugin::registry::NodeTypeRegistry;
use crate::plugin::traits::{Node, PortState};

pub(super) fn register(registry: &mut NodeTypeRegistry) {
    registry.register(Scale::definition(), |def| Box::new(Scale::new(def)));
    registry.register(Add::definition(), |def| Box::new(Add::new(def)));
}

/// `out = in * factor`, element-wise for arrays.
pub struct Scale {
    ports: PortState,
    factor: f64,
}

impl Scale {
    pub const TYPE_ID: &'static str = "math.scale";

    pub fn definition() -> NodeTypeDefinition {
        use PortDataType::*;
        node(Self::TYPE_ID, "Scale", NodeCategory::Math)
            .with_inputs(vec![inp("in", "Input", Any)])
            .with_outputs(vec![out("out", "Output", Any)])
            .with_properties(vec![prop("factor", "Factor", Value::number(2.0))])
            .with_displays(vec![field("result", "Result")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
            factor: 2.0,
        }
    }
}

impl Node for Scale {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        let Some(input) = self.ports.input("in") else {
            return Ok(());
        };
        let scaled = input
            .scaled(self.factor)
            .ok_or_else(|| anyhow!("Scale expects a numeric input, got {:?}", input))?;
        self.ports.set_output("out", Some(scaled));
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("result".to_string(), self.ports.output("out").cloned())]
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "factor").then(|| Value::number(self.factor))
    }

    fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
        if name != "factor" {
            bail!("Scale has no field '{}'", name);
        }
        self.factor = value
            .as_number()
            .ok_or_else(|| anyhow!("Scale.factor expects a number"))?;
        Ok(())
    }
}

/// `out = a + b`. A single present operand passes through, so feedback loops
/// can start from an empty edge.
pub struct Add {
    ports: PortState,
}

impl Add {
    pub const TYPE_ID: &'static str = "math.add";

    pub fn definition() -> NodeTypeDefinition {
        use PortDataType::*;
        node(Self::TYPE_ID, "Add", NodeCategory::Math)
            .with_inputs(vec![inp("a", "A", Any), inp("b", "B", Any)])
            .with_outputs(vec![out("out", "Sum", Any)])
            .with_displays(vec![field("result", "Result")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
        }
    }
}

impl Node for Add {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        let sum = match (self.ports.input("a"), self.ports.input("b")) {
            (None, None) => return Ok(()),
            (Some(x), None) | (None, Some(x)) => x.clone(),
            (Some(a), Some(b)) => a
                .sum(b)
                .ok_or_else(|| anyhow!("cannot add {:?} and {:?}", a, b))?,
        };
        self.ports.set_output("out", Some(sum));
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("result".to_string(), self.ports.output("out").cloned())]
    }
}
