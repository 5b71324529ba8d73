use thiserror::Error;

use crate::evaluation::fault::EvaluationFault;
use crate::model::connection::{Connection, PortDataType};
use crate::model::node::NodeId;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),
    #[error("Port not found: {node_id}.{port}")]
    UnknownPort { node_id: NodeId, port: String },
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
    #[error("Field not found: {node_id}.{field}")]
    UnknownField { node_id: NodeId, field: String },
    #[error("Incompatible port types: {from:?} -> {to:?}")]
    IncompatiblePorts { from: PortDataType, to: PortDataType },
    #[error("Connection exists: {0}")]
    DuplicateConnection(Connection),
    #[error("Connection not found: {0}")]
    ConnectionNotFound(Connection),
    #[error("Cannot replace node {node_id} of type '{expected}' with type '{found}'")]
    IncompatibleReplacement {
        node_id: NodeId,
        expected: String,
        found: String,
    },
    #[error(transparent)]
    Evaluation(#[from] EvaluationFault),
    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl EngineError {
    /// True for errors raised by the graph registry before any state changed.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownNode(_)
                | EngineError::UnknownPort { .. }
                | EngineError::UnknownNodeType(_)
                | EngineError::UnknownField { .. }
                | EngineError::IncompatiblePorts { .. }
                | EngineError::DuplicateConnection(_)
                | EngineError::ConnectionNotFound(_)
                | EngineError::IncompatibleReplacement { .. }
        )
    }
}
