//! Live dataflow engine for node graphs with feedback cycles.
//!
//! The [`Engine`] owns a [`GraphRegistry`] and a [`SignalStore`]. Each tick
//! evaluates every node once in a cycle-tolerant topological order; feedback
//! edges deliver the previous tick's value. Out of tick, edits are applied by
//! probing only the part of the graph downstream of the change.

pub mod error;
pub mod evaluation;
pub mod graph;
pub mod model;
pub mod plugin;
pub mod runtime;
pub mod util;

pub use error::EngineError;
pub use evaluation::engine::{Engine, ReplaceReport, StepReport};
pub use evaluation::fault::EvaluationFault;
pub use evaluation::signals::SignalStore;
pub use graph::GraphRegistry;
pub use model::connection::{Connection, PortId};
pub use model::node::{NodeId, NodeInstance};
pub use model::value::Value;
pub use plugin::registry::NodeTypeRegistry;
pub use plugin::traits::Node;
pub use runtime::{Host, HostMessage, RuntimeConfig, SharedEngine, StateSnapshot};
