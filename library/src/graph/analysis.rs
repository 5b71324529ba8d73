//! Graph analysis: evaluation order and port wiring.
//!
//! Both are derived from the registry on every call and never cached, so any
//! structural edit between calls is picked up automatically.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::GraphRegistry;
use crate::model::connection::PortId;
use crate::model::node::NodeId;

/// Evaluation order over every node in the graph.
///
/// Kahn's algorithm where a node's in-degree is the number of *distinct*
/// upstream nodes. The ready queue is FIFO, seeded in node-map order, and a
/// dependent is enqueued the moment its last dependency is popped. Nodes that
/// are never released (cycle members, and anything downstream of a cycle) are
/// appended afterwards in node-map order. Inside a cycle at least one edge
/// therefore carries the previous tick's value.
pub fn evaluation_order(graph: &GraphRegistry) -> Vec<NodeId> {
    let nodes = graph.nodes();
    let mut dependencies: HashMap<NodeId, HashSet<NodeId>> =
        nodes.keys().map(|id| (*id, HashSet::new())).collect();
    let mut dependents: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();

    for conn in graph.connections() {
        let (from, to) = (conn.from.node_id, conn.to.node_id);
        if !nodes.contains_key(&from) {
            continue;
        }
        if let Some(deps) = dependencies.get_mut(&to) {
            deps.insert(from);
            dependents.entry(from).or_default().insert(to);
        }
    }

    let mut ready: VecDeque<NodeId> = nodes
        .keys()
        .filter(|id| dependencies[*id].is_empty())
        .copied()
        .collect();
    let mut sorted = Vec::with_capacity(nodes.len());
    let mut processed = HashSet::new();

    while let Some(node) = ready.pop_front() {
        sorted.push(node);
        processed.insert(node);
        let Some(children) = dependents.get(&node) else {
            continue;
        };
        for child in children {
            let Some(deps) = dependencies.get_mut(child) else {
                continue;
            };
            if deps.remove(&node) && deps.is_empty() && !processed.contains(child) {
                ready.push_back(*child);
            }
        }
    }

    // Cycles: append the remainder in node-map order.
    for id in nodes.keys() {
        if !processed.contains(id) {
            sorted.push(*id);
        }
    }

    sorted
}

/// Input sources and downstream fan-out, built from the current connections.
#[derive(Debug, Default)]
pub struct Wiring {
    /// (node, input port) → source output port
    incoming: HashMap<NodeId, HashMap<String, PortId>>,
    /// node → downstream nodes, one entry per connection, in registration order
    outgoing: HashMap<NodeId, Vec<NodeId>>,
}

impl Wiring {
    /// If an input is transiently fed by more than one connection, the most
    /// recently registered one wins.
    pub fn from_graph(graph: &GraphRegistry) -> Self {
        let mut wiring = Wiring::default();
        for conn in graph.connections() {
            wiring
                .incoming
                .entry(conn.to.node_id)
                .or_default()
                .insert(conn.to.port.clone(), conn.from.clone());
            wiring
                .outgoing
                .entry(conn.from.node_id)
                .or_default()
                .push(conn.to.node_id);
        }
        wiring
    }

    /// The output port feeding `(node, input)`, if connected.
    pub fn source_of(&self, node: NodeId, input: &str) -> Option<&PortId> {
        self.incoming.get(&node)?.get(input)
    }

    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        self.outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }
}
