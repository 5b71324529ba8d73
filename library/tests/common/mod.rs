#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use signalflow::model::connection::{PortDataType, PortDefinition};
use signalflow::plugin::{FieldDefinition, NodeCategory, NodeTypeDefinition, PortState};
use signalflow::{Node, Value};

/// Route engine logs through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Labels of evaluated nodes, in evaluation order.
pub type EvalLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EvalLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &EvalLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

type Behaviour = Box<dyn FnMut(&mut PortState) -> anyhow::Result<()> + Send>;

/// Node whose compute step is a closure, recording every evaluation.
pub struct TestNode {
    ports: PortState,
    label: String,
    log: EvalLog,
    behaviour: Behaviour,
    init_error: Option<String>,
    memory: Option<Value>,
    accepts_fields: bool,
}

impl TestNode {
    fn new(
        definition: NodeTypeDefinition,
        label: &str,
        log: &EvalLog,
        behaviour: Behaviour,
    ) -> Self {
        Self {
            ports: PortState::new(Arc::new(definition)),
            label: label.to_string(),
            log: Arc::clone(log),
            behaviour,
            init_error: None,
            memory: None,
            accepts_fields: true,
        }
    }

    pub fn boxed(self) -> Box<dyn Node> {
        Box::new(self)
    }
}

impl Node for TestNode {
    fn definition(&self) -> &Arc<NodeTypeDefinition> {
        self.ports.definition()
    }

    fn set_input(&mut self, port: &str, value: Option<Value>) {
        self.ports.set_input(port, value);
    }

    fn input(&self, port: &str) -> Option<Value> {
        self.ports.input(port).cloned()
    }

    fn output(&self, port: &str) -> Option<Value> {
        self.ports.output(port).cloned()
    }

    fn evaluate(&mut self) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(self.label.clone());
        (self.behaviour)(&mut self.ports)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "memory" => self.memory.clone(),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
        if !self.accepts_fields {
            bail!("'{}' is read-only", name);
        }
        self.memory = Some(value);
        Ok(())
    }

    fn on_added(&mut self) -> anyhow::Result<()> {
        match &self.init_error {
            Some(message) => bail!("{}", message),
            None => Ok(()),
        }
    }
}

pub fn port(name: &str) -> PortDefinition {
    PortDefinition::new(name, name, PortDataType::Any)
}

pub fn definition(type_id: &str, inputs: &[&str], outputs: &[&str]) -> NodeTypeDefinition {
    NodeTypeDefinition::new(type_id, type_id, NodeCategory::Custom)
        .with_inputs(inputs.iter().map(|p| port(p)).collect())
        .with_outputs(outputs.iter().map(|p| port(p)).collect())
}

/// Source emitting `value`; already holds it from construction.
pub fn generator(label: &str, value: f64, log: &EvalLog) -> Box<dyn Node> {
    let mut node = TestNode::new(
        definition("test.gen", &[], &["out"]),
        label,
        log,
        Box::new(move |ports| {
            ports.set_output("out", Some(Value::number(value)));
            Ok(())
        }),
    );
    node.ports.set_output("out", Some(Value::number(value)));
    node.boxed()
}

/// `out = 2 * in`; does nothing while `in` is absent.
pub fn doubler(label: &str, log: &EvalLog) -> Box<dyn Node> {
    TestNode::new(
        definition("test.double", &["in"], &["out"]),
        label,
        log,
        Box::new(|ports| {
            let Some(input) = ports.input("in") else {
                return Ok(());
            };
            let x = input.as_number().ok_or_else(|| anyhow!("not a number"))?;
            ports.set_output("out", Some(Value::number(x * 2.0)));
            Ok(())
        }),
    )
    .boxed()
}

/// `out = in + 1`, treating an absent input as 0. Used to build cycles.
pub fn relay(label: &str, log: &EvalLog) -> Box<dyn Node> {
    TestNode::new(
        definition("test.relay", &["in"], &["out"]),
        label,
        log,
        Box::new(|ports| {
            let x = ports.input("in").and_then(Value::as_number).unwrap_or(0.0);
            ports.set_output("out", Some(Value::number(x + 1.0)));
            Ok(())
        }),
    )
    .boxed()
}

/// Always fails with "boom".
pub fn faulty(label: &str, log: &EvalLog) -> Box<dyn Node> {
    TestNode::new(
        definition("test.faulty", &["in"], &["out"]),
        label,
        log,
        Box::new(|_| -> anyhow::Result<()> { bail!("boom") }),
    )
    .boxed()
}

/// Panics instead of returning an error.
pub fn panicking(label: &str, log: &EvalLog) -> Box<dyn Node> {
    TestNode::new(
        definition("test.panic", &[], &["out"]),
        label,
        log,
        Box::new(|_| -> anyhow::Result<()> { panic!("index out of range") }),
    )
    .boxed()
}

/// A sink whose only input takes booleans.
pub fn boolean_sink(label: &str, log: &EvalLog) -> Box<dyn Node> {
    let def = NodeTypeDefinition::new("test.bool_sink", "Bool Sink", NodeCategory::Custom)
        .with_inputs(vec![PortDefinition::new("flag", "Flag", PortDataType::Boolean)]);
    TestNode::new(def, label, log, Box::new(|_| Ok(()))).boxed()
}

/// Copies `in` to every declared output.
pub fn passthrough(definition: NodeTypeDefinition, label: &str, log: &EvalLog) -> Box<dyn Node> {
    let outputs: Vec<String> = definition.outputs.iter().map(|p| p.name.clone()).collect();
    TestNode::new(
        definition,
        label,
        log,
        Box::new(move |ports| {
            let value = ports.input("in").cloned();
            for name in &outputs {
                ports.set_output(name, value.clone());
            }
            Ok(())
        }),
    )
    .boxed()
}

/// Node whose init hook fails.
pub fn failing_init(label: &str, log: &EvalLog) -> Box<dyn Node> {
    let mut node = TestNode::new(
        definition("test.failing_init", &[], &["out"]),
        label,
        log,
        Box::new(|_| Ok(())),
    );
    node.init_error = Some("device not available".to_string());
    node.boxed()
}

/// Node with a persisted "memory" field. `memory` is the value it starts
/// with; when `accepts_fields` is false every `set_field` fails.
pub fn keeper(
    label: &str,
    log: &EvalLog,
    memory: Option<Value>,
    accepts_fields: bool,
) -> Box<dyn Node> {
    let def = definition("test.keeper", &[], &["out"])
        .with_persisted(vec![FieldDefinition::new("memory", "Memory")]);
    let mut node = TestNode::new(def, label, log, Box::new(|_| Ok(())));
    node.memory = memory;
    node.accepts_fields = accepts_fields;
    node.boxed()
}
