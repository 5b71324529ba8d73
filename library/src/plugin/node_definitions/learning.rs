use std::sync::Arc;

use anyhow::{anyhow, bail};

use super::{field, inp, node, out, prop};
use crate::model::connection::PortDataType;
use crate::model::value::Value;
use crate::plugin::node_types::{NodeCategory, NodeTypeDefinition};
use crate::plugin::registry::NodeTypeRegistry;
use crate::plugin::traits::{Node, PortState};

pub(super) fn register(registry: &mut NodeTypeRegistry) {
    registry.register(MovingAverage::definition(), |def| {
        Box::new(MovingAverage::new(def))
    });
}

/// Exponential moving average: `avg = avg * (1 - alpha) + in * alpha`.
///
/// The running average is persisted so it survives node replacement.
pub struct MovingAverage {
    ports: PortState,
    alpha: f64,
    average: Option<Value>,
}

impl MovingAverage {
    pub const TYPE_ID: &'static str = "learning.moving_average";

    pub fn definition() -> NodeTypeDefinition {
        use PortDataType::*;
        node(Self::TYPE_ID, "Moving Average", NodeCategory::Learning)
            .with_inputs(vec![inp("in", "Input", Any)])
            .with_outputs(vec![out("out", "Average", Any)])
            .with_properties(vec![prop("alpha", "Alpha", Value::number(0.1))])
            .with_displays(vec![field("preview", "Average")])
            .with_persisted(vec![field("average", "Average")])
            .with_actions(vec![field("reinit", "Reinit")])
    }

    pub fn new(definition: Arc<NodeTypeDefinition>) -> Self {
        Self {
            ports: PortState::new(definition),
            alpha: 0.1,
            average: None,
        }
    }

    /// Forget the running average.
    pub fn reinit(&mut self) {
        self.average = None;
        self.ports.set_output("out", None);
    }
}

impl Node for MovingAverage {
    forward_ports!();

    fn evaluate(&mut self) -> anyhow::Result<()> {
        let Some(input) = self.ports.input("in") else {
            return Ok(());
        };
        let next = match &self.average {
            None => input.clone(),
            Some(avg) => avg
                .scaled(1.0 - self.alpha)
                .zip(input.scaled(self.alpha))
                .and_then(|(a, b)| a.sum(&b))
                .ok_or_else(|| anyhow!("input shape does not match the running average"))?,
        };
        self.ports.set_output("out", Some(next.clone()));
        self.average = Some(next);
        Ok(())
    }

    fn display_fields(&self) -> Vec<(String, Option<Value>)> {
        vec![("preview".to_string(), self.average.clone())]
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "alpha" => Some(Value::number(self.alpha)),
            "average" => self.average.clone(),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
        match name {
            "alpha" => {
                let alpha = value
                    .as_number()
                    .filter(|a| (0.0..=1.0).contains(a))
                    .ok_or_else(|| anyhow!("alpha must be a number in [0, 1]"))?;
                self.alpha = alpha;
            }
            "average" => self.average = Some(value),
            _ => bail!("MovingAverage has no field '{}'", name),
        }
        Ok(())
    }

    fn run_action(&mut self, name: &str) -> anyhow::Result<()> {
        match name {
            "reinit" => self.reinit(),
            _ => bail!("MovingAverage has no action '{}'", name),
        }
        Ok(())
    }
}
