mod common;

use common::{
    boolean_sink, definition, doubler, failing_init, generator, keeper, new_log, passthrough,
};
use signalflow::plugin::node_definitions::{Constant, Counter, Display, MovingAverage, Scale};
use signalflow::{
    Connection, Engine, EngineError, NodeId, NodeTypeRegistry, PortId, ReplaceReport, Value,
};

fn insert(engine: &mut Engine, registry: &NodeTypeRegistry, type_id: &str) -> NodeId {
    let node = registry.create(type_id).expect("built-in type");
    engine.insert_node(None, node).expect("insert should succeed")
}

fn input_of(engine: &Engine, id: NodeId, port: &str) -> Option<Value> {
    engine.graph().node(id).unwrap().node.input(port)
}

#[test]
fn test_insert_publishes_generator_output() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();

    let constant = insert(&mut engine, &registry, Constant::TYPE_ID);

    assert_eq!(engine.signal(constant, "out"), Some(&Value::number(1.0)));
    assert_eq!(engine.graph().node(constant).unwrap().name, "Constant");
}

#[test]
fn test_insert_with_failing_init_leaves_graph_unchanged() {
    let log = new_log();
    let mut engine = Engine::new();

    let err = engine.insert_node(Some("camera"), failing_init("camera", &log)).unwrap_err();

    let EngineError::Evaluation(fault) = err else {
        panic!("expected an evaluation fault, got {:?}", err);
    };
    assert_eq!(fault.node_name, "camera");
    assert!(fault.message().contains("device not available"));
    assert!(engine.graph().is_empty());
}

#[test]
fn test_connect_propagates_downstream() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let constant = insert(&mut engine, &registry, Constant::TYPE_ID);
    let scale = insert(&mut engine, &registry, Scale::TYPE_ID);
    let display = insert(&mut engine, &registry, Display::TYPE_ID);

    engine
        .connect(Connection::between(scale, "out", display, "in"))
        .unwrap();
    let updated = engine
        .connect(Connection::between(constant, "out", scale, "in"))
        .unwrap();

    assert!(updated.contains(&scale));
    assert!(updated.contains(&display));
    assert_eq!(engine.signal(scale, "out"), Some(&Value::number(2.0)));
    assert_eq!(input_of(&engine, display, "in"), Some(Value::number(2.0)));
}

#[test]
fn test_connect_replaces_existing_input() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let first = insert(&mut engine, &registry, Constant::TYPE_ID);
    let second = insert(&mut engine, &registry, Constant::TYPE_ID);
    let scale = insert(&mut engine, &registry, Scale::TYPE_ID);
    engine.set_property(second, "value", Value::number(3.0)).unwrap();

    engine.connect(Connection::between(first, "out", scale, "in")).unwrap();
    engine.connect(Connection::between(second, "out", scale, "in")).unwrap();

    let target = PortId::new(scale, "in");
    assert_eq!(engine.graph().connections_into(&target).count(), 1);
    assert_eq!(engine.signal(scale, "out"), Some(&Value::number(6.0)));
}

#[test]
fn test_connect_rejects_bad_connections() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let log = new_log();
    let mut engine = Engine::new();
    let counter = insert(&mut engine, &registry, Counter::TYPE_ID);
    let scale = insert(&mut engine, &registry, Scale::TYPE_ID);
    let sink = engine.insert_node(Some("sink"), boolean_sink("sink", &log)).unwrap();
    let conn = Connection::between(counter, "out", scale, "in");
    engine.connect(conn.clone()).unwrap();

    let duplicate = engine.connect(conn).unwrap_err();
    assert!(matches!(duplicate, EngineError::DuplicateConnection(_)));

    let mismatch = engine
        .connect(Connection::between(counter, "out", sink, "flag"))
        .unwrap_err();
    assert!(matches!(mismatch, EngineError::IncompatiblePorts { .. }));

    let unknown_port = engine
        .connect(Connection::between(counter, "nope", scale, "in"))
        .unwrap_err();
    assert!(matches!(unknown_port, EngineError::UnknownPort { .. }));
    assert!(unknown_port.is_structural());

    let unknown_node = engine
        .connect(Connection::between(NodeId(99), "out", scale, "in"))
        .unwrap_err();
    assert!(matches!(unknown_node, EngineError::UnknownNode(NodeId(99))));

    assert_eq!(engine.graph().connections().len(), 1);
}

#[test]
fn test_disconnect_clears_input() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let constant = insert(&mut engine, &registry, Constant::TYPE_ID);
    let display = insert(&mut engine, &registry, Display::TYPE_ID);
    let conn = Connection::between(constant, "out", display, "in");
    engine.connect(conn.clone()).unwrap();
    assert!(input_of(&engine, display, "in").is_some());

    engine.disconnect(&conn).unwrap();

    assert_eq!(input_of(&engine, display, "in"), None);
    assert!(engine.graph().connections().is_empty());
    let again = engine.disconnect(&conn).unwrap_err();
    assert!(matches!(again, EngineError::ConnectionNotFound(_)));
}

#[test]
fn test_delete_node_drops_edges_and_signals() {
    let log = new_log();
    let mut engine = Engine::new();
    let source = engine.insert_node(None, generator("gen", 2.0, &log)).unwrap();
    let middle = engine.insert_node(None, doubler("middle", &log)).unwrap();
    let last = engine.insert_node(None, doubler("last", &log)).unwrap();
    engine.connect(Connection::between(source, "out", middle, "in")).unwrap();
    engine.connect(Connection::between(middle, "out", last, "in")).unwrap();
    assert_eq!(engine.signal(last, "out"), Some(&Value::number(8.0)));

    engine.delete_node(middle).unwrap();

    assert!(!engine.graph().contains(middle));
    assert!(engine.graph().connections().is_empty());
    assert!(engine.signals().keys_for(middle).is_empty());
    assert_eq!(input_of(&engine, last, "in"), None);
    assert!(matches!(
        engine.delete_node(middle),
        Err(EngineError::UnknownNode(_))
    ));
}

#[test]
fn test_set_property_reaches_consumers() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let constant = insert(&mut engine, &registry, Constant::TYPE_ID);
    let scale = insert(&mut engine, &registry, Scale::TYPE_ID);
    engine.connect(Connection::between(constant, "out", scale, "in")).unwrap();

    engine.set_property(constant, "value", Value::number(4.0)).unwrap();
    assert_eq!(engine.signal(scale, "out"), Some(&Value::number(8.0)));

    engine.set_property(scale, "factor", Value::number(0.5)).unwrap();
    assert_eq!(engine.signal(scale, "out"), Some(&Value::number(2.0)));
}

#[test]
fn test_set_property_rejects_bad_values() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let average = insert(&mut engine, &registry, MovingAverage::TYPE_ID);

    let unknown = engine
        .set_property(average, "beta", Value::number(0.5))
        .unwrap_err();
    assert!(matches!(unknown, EngineError::UnknownField { .. }));

    // Persisted stores are not user-editable properties.
    let persisted = engine
        .set_property(average, "average", Value::number(0.5))
        .unwrap_err();
    assert!(matches!(persisted, EngineError::UnknownField { .. }));

    let out_of_range = engine
        .set_property(average, "alpha", Value::number(2.0))
        .unwrap_err();
    assert!(matches!(out_of_range, EngineError::InvalidArgument(_)));
}

#[test]
fn test_reinit_action_restarts_average() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let constant = insert(&mut engine, &registry, Constant::TYPE_ID);
    let average = insert(&mut engine, &registry, MovingAverage::TYPE_ID);
    engine.connect(Connection::between(constant, "out", average, "in")).unwrap();
    engine.set_property(constant, "value", Value::number(3.0)).unwrap();
    let smoothed = engine.signal(average, "out").and_then(|v| v.as_number()).unwrap();
    assert!((smoothed - 1.2).abs() < 1e-9);

    let updated = engine.run_action(average, "reinit").unwrap();

    assert!(updated.contains(&average));
    assert_eq!(engine.signal(average, "out"), Some(&Value::number(3.0)));
    let node = &engine.graph().node(average).unwrap().node;
    assert_eq!(node.field("average"), Some(Value::number(3.0)));
}

#[test]
fn test_run_action_rejects_unknown_names() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let average = insert(&mut engine, &registry, MovingAverage::TYPE_ID);
    let counter = insert(&mut engine, &registry, Counter::TYPE_ID);

    let unknown = engine.run_action(average, "explode").unwrap_err();
    assert!(matches!(unknown, EngineError::UnknownField { .. }));

    let undeclared = engine.run_action(counter, "reinit").unwrap_err();
    assert!(matches!(undeclared, EngineError::UnknownField { .. }));

    let missing = engine.run_action(NodeId(99), "reinit").unwrap_err();
    assert!(matches!(missing, EngineError::UnknownNode(NodeId(99))));
}

#[test]
fn test_replace_keeps_persisted_state() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let counter = insert(&mut engine, &registry, Counter::TYPE_ID);
    engine.set_property(counter, "step", Value::Integer(10)).unwrap();
    let before = engine.graph().node(counter).unwrap().node.field("count");

    let report = engine
        .replace_node(counter, registry.create(Counter::TYPE_ID).unwrap())
        .unwrap();

    assert_eq!(report, ReplaceReport::default());
    let node = &engine.graph().node(counter).unwrap().node;
    assert_eq!(node.field("count"), before);
    assert_eq!(node.field("step"), Some(Value::Integer(10)));
    engine.execute_step().unwrap();
    let count = before.and_then(|v| v.as_integer()).unwrap();
    assert_eq!(engine.signal(counter, "out"), Some(&Value::Integer(count + 10)));
}

#[test]
fn test_replace_with_other_type_is_rejected() {
    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let counter = insert(&mut engine, &registry, Counter::TYPE_ID);

    let err = engine
        .replace_node(counter, registry.create(Constant::TYPE_ID).unwrap())
        .unwrap_err();

    assert!(matches!(err, EngineError::IncompatibleReplacement { .. }));
    assert_eq!(engine.graph().node(counter).unwrap().type_id(), Counter::TYPE_ID);
}

#[test]
fn test_replace_removes_edges_on_dropped_ports() {
    common::init_logging();
    let log = new_log();
    let mut engine = Engine::new();
    let source = engine.graph_mut().add_node(generator("gen", 1.0, &log));
    let split = engine.graph_mut().add_named_node(
        "split",
        passthrough(definition("test.split", &["in"], &["out", "extra"]), "split", &log),
    );
    let main = engine.graph_mut().add_node(doubler("main", &log));
    let side = engine.graph_mut().add_node(doubler("side", &log));
    let dropped = Connection::between(split, "extra", side, "in");
    let graph = engine.graph_mut();
    graph.add_connection(Connection::between(source, "out", split, "in")).unwrap();
    graph.add_connection(Connection::between(split, "out", main, "in")).unwrap();
    graph.add_connection(dropped.clone()).unwrap();
    engine.execute_step().unwrap();

    let narrower = passthrough(definition("test.split", &["in"], &["out"]), "split v2", &log);
    let report = engine.replace_node(split, narrower).unwrap();

    assert_eq!(report.removed_connections, vec![dropped]);
    assert_eq!(report.dropped_signals, vec![PortId::new(split, "extra")]);
    assert_eq!(engine.graph().connections().len(), 2);
    assert!(engine.signal(split, "out").is_some(), "surviving ports keep their signal");
    assert_eq!(engine.graph().node(split).unwrap().name, "split");

    engine.execute_step().unwrap();
    assert_eq!(input_of(&engine, side, "in"), None);
    assert_eq!(engine.signal(main, "out"), Some(&Value::number(2.0)));
}

#[test]
fn test_replace_drops_rejected_field() {
    common::init_logging();
    let log = new_log();
    let mut engine = Engine::new();
    let old = keeper("keeper", &log, Some(Value::number(7.0)), true);
    let id = engine.insert_node(Some("keeper"), old).unwrap();

    let strict = keeper("keeper v2", &log, None, false);
    let report = engine.replace_node(id, strict).unwrap();

    assert_eq!(report.dropped_fields, vec!["memory".to_string()]);
    let instance = engine.graph().node(id).unwrap();
    assert_eq!(instance.name, "keeper");
    assert_eq!(instance.node.field("memory"), None);
}
