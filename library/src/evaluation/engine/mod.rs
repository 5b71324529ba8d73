//! Evaluation engine: ticks and out-of-tick propagation.

mod editing;
mod propagation;
mod replace;

pub use replace::ReplaceReport;

use std::collections::BTreeSet;

use log::{debug, error, info};

use super::fault::{self, EvaluationFault};
use super::signals::SignalStore;
use crate::error::EngineError;
use crate::graph::GraphRegistry;
use crate::graph::analysis::{self, Wiring};
use crate::model::connection::PortId;
use crate::model::node::{NodeId, NodeInstance};
use crate::util::timing::ScopedTimer;

const DEFAULT_SPEED: f64 = 10.0;

/// Result of one full tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Step counter after this tick.
    pub step: u64,
    /// Nodes that wrote at least one output this tick.
    pub updated: BTreeSet<NodeId>,
}

/// The dataflow engine: one graph, one signal store, one step counter.
///
/// Not designed for concurrent ticks. Hosts that drive it from several tasks
/// must serialize all access (see `runtime::SharedEngine`).
pub struct Engine {
    graph: GraphRegistry,
    signals: SignalStore,
    step_count: u64,
    running: bool,
    speed: f64,
    actual_hz: f64,
    last_fault: Option<EvaluationFault>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_graph(GraphRegistry::new())
    }

    pub fn with_graph(graph: GraphRegistry) -> Self {
        Self {
            graph,
            signals: SignalStore::new(),
            step_count: 0,
            running: false,
            speed: DEFAULT_SPEED,
            actual_hz: 0.0,
            last_fault: None,
        }
    }

    pub fn graph(&self) -> &GraphRegistry {
        &self.graph
    }

    /// Direct structural access. Nothing is cached across calls, so edits
    /// made here are picked up by the next tick or propagation.
    pub fn graph_mut(&mut self) -> &mut GraphRegistry {
        &mut self.graph
    }

    pub fn signals(&self) -> &SignalStore {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut SignalStore {
        &mut self.signals
    }

    // --- Control surface ---

    /// Set the running flag and clear any previous fault.
    pub fn start(&mut self) {
        self.running = true;
        self.last_fault = None;
        info!("Engine started at step {}", self.step_count);
    }

    /// Clear the running flag. A tick already in flight is not interrupted.
    pub fn stop(&mut self) {
        self.running = false;
        info!("Engine stopped at step {}", self.step_count);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Zero the step counter, stop, and clear the signal store.
    pub fn reset(&mut self) {
        self.step_count = 0;
        self.running = false;
        self.signals.clear();
        info!("Engine reset");
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_fault(&self) -> Option<&EvaluationFault> {
        self.last_fault.as_ref()
    }

    /// Target tick rate in Hz.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the target tick rate, clamped to `[1, max_hz]`.
    pub fn set_speed(&mut self, speed: f64, max_hz: f64) {
        let max_hz = max_hz.max(1.0);
        self.speed = if speed.is_finite() {
            speed.clamp(1.0, max_hz)
        } else {
            max_hz
        };
    }

    /// Tick rate measured by the host.
    pub fn actual_hz(&self) -> f64 {
        self.actual_hz
    }

    pub fn set_actual_hz(&mut self, hz: f64) {
        self.actual_hz = hz;
    }

    /// Current value of an output port, without evaluating anything.
    pub fn signal(&self, node_id: NodeId, port: &str) -> Option<&crate::model::value::Value> {
        self.signals.read(&PortId::new(node_id, port))
    }

    // --- Full tick ---

    /// Evaluate every node once in dependency order.
    ///
    /// Each node gets its inputs from the signal store (this tick's value if
    /// the producer already ran, the previous tick's otherwise), is evaluated
    /// unconditionally, and has its outputs written back immediately.
    ///
    /// On failure the tick is abandoned: the engine stops, the fault is kept
    /// as [`Engine::last_fault`], and signals written by nodes that already
    /// succeeded this tick stay in place.
    pub fn execute_step(&mut self) -> Result<StepReport, EngineError> {
        let _timer = ScopedTimer::debug_lazy(|| format!("Step {}", self.step_count + 1));
        let order = analysis::evaluation_order(&self.graph);
        let wiring = Wiring::from_graph(&self.graph);
        let mut updated = BTreeSet::new();

        for id in order {
            let Some(instance) = self.graph.node_mut(id) else {
                continue;
            };
            apply_inputs(instance, &wiring, &self.signals);

            if let Err(fault) = fault::invoke_tick(instance) {
                self.running = false;
                error!("{}", fault);
                debug!("Fault trace:\n{}", fault.trace);
                self.last_fault = Some(fault.clone());
                return Err(EngineError::Evaluation(fault));
            }

            if store_outputs(instance, &mut self.signals) > 0 {
                updated.insert(id);
            }
        }

        self.step_count += 1;
        debug!(
            "Step {} updated {} of {} nodes",
            self.step_count,
            updated.len(),
            self.graph.len()
        );
        Ok(StepReport {
            step: self.step_count,
            updated,
        })
    }

    /// Copy every node's currently held outputs into the signal store.
    ///
    /// Covers outputs set outside a tick (construction, property edits).
    fn sync_signals_from_nodes(&mut self) {
        for instance in self.graph.nodes().values() {
            store_outputs(instance, &mut self.signals);
        }
    }
}

/// Set every declared input of `instance` from the signal store, clearing
/// unconnected ones. Returns whether any input ended up holding a value.
fn apply_inputs(instance: &mut NodeInstance, wiring: &Wiring, signals: &SignalStore) -> bool {
    let definition = std::sync::Arc::clone(instance.definition());
    let mut any_present = false;
    for port in &definition.inputs {
        let value = wiring
            .source_of(instance.id, &port.name)
            .and_then(|source| signals.read(source))
            .cloned();
        any_present |= value.is_some();
        instance.node.set_input(&port.name, value);
    }
    any_present
}

/// Write every present output of `instance` to the store. Returns the count.
fn store_outputs(instance: &NodeInstance, signals: &mut SignalStore) -> usize {
    let mut written = 0;
    for port in &instance.definition().outputs {
        if let Some(value) = instance.node.output(&port.name) {
            signals.write(PortId::new(instance.id, &port.name), value);
            written += 1;
        }
    }
    written
}
