//! Fault containment around node evaluation.
//!
//! A node may fail by returning an error or by panicking. Either way the
//! failure is turned into an [`EvaluationFault`]; engine state is never left
//! half-written by the failing node itself, since outputs are only copied to
//! the signal store after a successful evaluation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use thiserror::Error;

use crate::model::node::{NodeId, NodeInstance};

/// Structured record of a node evaluation failure.
#[derive(Error, Debug, Clone)]
#[error("Node '{node_name}' ({node_id}) error: {error}")]
pub struct EvaluationFault {
    pub node_id: NodeId,
    pub node_name: String,
    pub error: Arc<anyhow::Error>,
    /// Cause chain plus backtrace (when `RUST_BACKTRACE` enables capture).
    pub trace: String,
}

impl EvaluationFault {
    pub fn new(node_id: NodeId, node_name: &str, error: anyhow::Error) -> Self {
        let trace = format!("{:?}", error);
        Self {
            node_id,
            node_name: node_name.to_string(),
            error: Arc::new(error),
            trace,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Tick-mode invoke: always evaluates, whatever the inputs hold.
pub fn invoke_tick(instance: &mut NodeInstance) -> Result<(), EvaluationFault> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| instance.node.evaluate()));
    let error = match result {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(error)) => error,
        Err(payload) => anyhow!("panicked: {}", panic_message(payload.as_ref())),
    };
    Err(EvaluationFault::new(instance.id, &instance.name, error))
}

/// Probe-mode invoke, used outside ticks.
///
/// Nodes without input ports are always evaluated. Nodes with inputs are
/// evaluated only if at least one input currently holds a value. Returns
/// whether the node was evaluated.
pub fn invoke_probe(instance: &mut NodeInstance, has_input: bool) -> Result<bool, EvaluationFault> {
    if !instance.definition().inputs.is_empty() && !has_input {
        return Ok(false);
    }
    invoke_tick(instance).map(|()| true)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
