//! A small graph exercising every built-in type, including a feedback loop.

use signalflow::plugin::node_definitions::{Add, Constant, Counter, Display, MovingAverage, Scale};
use signalflow::{Connection, Engine, EngineError, NodeId, NodeTypeRegistry, Value};

pub struct DemoGraph {
    pub counter: NodeId,
    pub average: NodeId,
    pub accumulator: NodeId,
    pub displays: Vec<NodeId>,
}

/// counter -> scale(0.5) -> moving average -> display
/// constant(0.25) -> add <-> add (running sum) -> display
pub fn build(engine: &mut Engine, registry: &NodeTypeRegistry) -> Result<DemoGraph, EngineError> {
    let counter = engine.insert_node(Some("ticks"), registry.create(Counter::TYPE_ID)?)?;
    let half = engine.insert_node(Some("half"), registry.create(Scale::TYPE_ID)?)?;
    let average = engine.insert_node(Some("smoothed"), registry.create(MovingAverage::TYPE_ID)?)?;
    let shown_average = engine.insert_node(Some("average"), registry.create(Display::TYPE_ID)?)?;

    engine.set_property(half, "factor", Value::number(0.5))?;
    engine.set_property(average, "alpha", Value::number(0.2))?;
    engine.connect(Connection::between(counter, "out", half, "in"))?;
    engine.connect(Connection::between(half, "out", average, "in"))?;
    engine.connect(Connection::between(average, "out", shown_average, "in"))?;

    let increment = engine.insert_node(Some("increment"), registry.create(Constant::TYPE_ID)?)?;
    let accumulator = engine.insert_node(Some("sum"), registry.create(Add::TYPE_ID)?)?;
    let shown_sum = engine.insert_node(Some("total"), registry.create(Display::TYPE_ID)?)?;

    engine.set_property(increment, "value", Value::number(0.25))?;
    engine.connect(Connection::between(increment, "out", accumulator, "a"))?;
    engine.connect(Connection::between(accumulator, "out", accumulator, "b"))?;
    engine.connect(Connection::between(accumulator, "out", shown_sum, "in"))?;

    Ok(DemoGraph {
        counter,
        average,
        accumulator,
        displays: vec![shown_average, shown_sum],
    })
}
