//! Out-of-tick propagation: re-evaluate only what lies downstream of a change.

use std::collections::{BTreeSet, HashSet, VecDeque};

use log::{debug, warn};

use super::{Engine, apply_inputs, store_outputs};
use crate::evaluation::fault;
use crate::graph::analysis::Wiring;
use crate::model::node::NodeId;

impl Engine {
    /// Push the current state through the whole graph without ticking.
    ///
    /// Resynchronizes the signal store from every node's held outputs, then
    /// walks forward breadth-first from every node that has a signal, probing
    /// each downstream node at most once. Returns the visited nodes.
    pub fn propagate_current_state(&mut self) -> BTreeSet<NodeId> {
        self.sync_signals_from_nodes();
        let wiring = Wiring::from_graph(&self.graph);
        let seeds: Vec<NodeId> = self
            .graph
            .nodes()
            .keys()
            .filter(|id| self.signals.has_signals(**id))
            .copied()
            .collect();

        let updated =
            self.propagate_breadth_first(seeds, &wiring, HashSet::new(), BTreeSet::new());
        debug!("Propagated current state to {} nodes", updated.len());
        updated
    }

    /// Propagate from a single node.
    ///
    /// With `recompute_start` the start node is probed first (its inputs
    /// changed, e.g. a new incoming connection). Without it, only the nodes
    /// downstream are probed (e.g. one of its outgoing connections went away).
    /// An unknown id propagates nothing.
    pub fn propagate_from_node(
        &mut self,
        node_id: NodeId,
        recompute_start: bool,
    ) -> BTreeSet<NodeId> {
        if !self.graph.contains(node_id) {
            return BTreeSet::new();
        }
        self.sync_signals_from_nodes();
        let wiring = Wiring::from_graph(&self.graph);
        let mut processed = HashSet::new();
        let mut updated = BTreeSet::new();

        if recompute_start {
            if self.probe(node_id, &wiring) {
                updated.insert(node_id);
            }
            processed.insert(node_id);
        }

        let updated = self.propagate_breadth_first(vec![node_id], &wiring, processed, updated);
        debug!("Propagated from {} to {} nodes", node_id, updated.len());
        updated
    }

    fn propagate_breadth_first(
        &mut self,
        seeds: Vec<NodeId>,
        wiring: &Wiring,
        mut processed: HashSet<NodeId>,
        mut updated: BTreeSet<NodeId>,
    ) -> BTreeSet<NodeId> {
        let mut queued: HashSet<NodeId> = seeds.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = seeds.into();

        while let Some(source) = queue.pop_front() {
            for &target in wiring.successors(source) {
                if processed.contains(&target) || !self.graph.contains(target) {
                    continue;
                }
                let ok = self.probe(target, wiring);
                processed.insert(target);
                if ok {
                    updated.insert(target);
                }
                if queued.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        updated
    }

    /// Set inputs, probe, and store outputs for one node.
    ///
    /// A failing node is skipped: it is logged, writes nothing, and the walk
    /// carries on past it. Returns `false` only for such a failure.
    fn probe(&mut self, node_id: NodeId, wiring: &Wiring) -> bool {
        let Some(instance) = self.graph.node_mut(node_id) else {
            return false;
        };
        let has_input = apply_inputs(instance, wiring, &self.signals);
        match fault::invoke_probe(instance, has_input) {
            Ok(true) => {
                store_outputs(instance, &mut self.signals);
                true
            }
            Ok(false) => true,
            Err(fault) => {
                warn!("Skipping node during propagation: {}", fault);
                false
            }
        }
    }
}
