use std::sync::Arc;

use anyhow::{Context, bail};

use super::{field, node, out, prop};
use crate::model::connection::PortDataType;
use crate::model::value::Value;
use crate::plugin::node_types::{NodeCategory, NodeTypeDefinition};
use crate::plugin::registry::NodeTypeRegistry;
use crate::plugin::traits::{Node, PortState};

pub(super) fn register(registry: &mut NodeTypeRegistry) {
    registry.register(Constant::definition(), |def| Box::new(Constant::new(def)));
    registry.register(Counter::definition(), |def| Box::new(Counter::new(def)));
}

/// Emits its `value` property on every evaluation.
pub struct Constant {
    ports: PortState,
    value: Value,
}

impl Constant {
    pub const TYPE_ID: &'static str = "generator.constant";

    pub fn definition() -> NodeTypeDefinition {
        node(Self::TYPE_ID, "Constant", NodeCategory::Generator)
            .with_description("Emit a fixed value")
            .with_outputs(vec![out("out", "Value", PortDataType::Any)])
            .with_properties(vec![prop("value", "Value", Value::number(1.0))])
            .with_displays(vec![field("current", "Current")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
            value: Value::number(1.0),
        }
    }
}

impl Node for Constant {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        self.ports.set_output("out", Some(self.value.clone()));
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("current".to_string(), self.ports.output("out").cloned())]
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "value").then(|| self.value.clone())
    }

    fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
        if name != "value" {
            bail!("Constant has no field '{}'", name);
        }
        self.value = value;
        Ok(())
    }

    fn on_added(&mut self) -> anyhow::Result<()> {
        self.evaluate()
    }
}

/// Counts up by `step` on every evaluation. The count survives replacement.
pub struct Counter {
    ports: PortState,
    step: i64,
    count: i64,
}

impl Counter {
    pub const TYPE_ID: &'static str = "generator.counter";

    pub fn definition() -> NodeTypeDefinition {
        node(Self::TYPE_ID, "Counter", NodeCategory::Generator)
            .with_outputs(vec![out("out", "Count", PortDataType::Integer)])
            .with_properties(vec![prop("step", "Step", Value::Integer(1))])
            .with_displays(vec![field("count_text", "Count")])
            .with_persisted(vec![field("count", "Count")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
            step: 1,
            count: 0,
        }
    }
}

impl Node for Counter {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        self.count = self
            .count
            .checked_add(self.step)
            .context("counter overflowed")?;
        self.ports.set_output("out", Some(Value::Integer(self.count)));
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("count_text".to_string(), Some(Value::Text(self.count.to_string())))]
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "step" => Some(Value::Integer(self.step)),
            "count" => Some(Value::Integer(self.count)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
        let v = value
            .as_integer()
            .with_context(|| format!("Counter.{} expects an integer", name))?;
        match name {
            "step" => self.step = v,
            "count" => self.count = v,
            _ => bail!("Counter has no field '{}'", name),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_counts_by_step() {
        let mut counter = Counter::new(Arc::new(Counter::definition()));
        counter.set_field("step", Value::Integer(3)).unwrap();
        counter.evaluate().unwrap();
        counter.evaluate().unwrap();
        assert_eq!(counter.output("out"), Some(Value::Integer(6)));
        assert_eq!(counter.field("count"), Some(Value::Integer(6)));
    }

    #[test]
    fn test_counter_rejects_non_integer_step() {
        let mut counter = Counter::new(Arc::new(Counter::definition()));
        assert!(counter.set_field("step", Value::number(0.5)).is_err());
    }

    #[test]
    fn test_constant_publishes_on_added() {
        let mut constant = Constant::new(Arc::new(Constant::definition()));
        constant.set_field("value", Value::Integer(5)).unwrap();
        constant.on_added().unwrap();
        assert_eq!(constant.output("out"), Some(Value::Integer(5)));
    }
}
