//! Serializable views of engine state pushed to subscribers.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::evaluation::engine::Engine;
use crate::evaluation::fault::EvaluationFault;
use crate::model::node::NodeId;
use crate::model::value::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub running: bool,
    pub speed: f64,
    pub step: u64,
    pub actual_hz: f64,
}

impl EngineStatus {
    pub fn of(engine: &Engine) -> Self {
        Self {
            running: engine.is_running(),
            speed: engine.speed(),
            step: engine.step_count(),
            actual_hz: engine.actual_hz(),
        }
    }
}

/// Display fields of one node, in declaration order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub type_id: String,
    pub fields: Vec<(String, Option<Value>)>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub status: EngineStatus,
    pub nodes: Vec<NodeSnapshot>,
}

impl StateSnapshot {
    /// Read display fields of every node. Evaluates nothing.
    pub fn capture(engine: &Engine) -> Self {
        let nodes = engine
            .graph()
            .nodes()
            .values()
            .map(|instance| NodeSnapshot {
                id: instance.id,
                name: instance.name.clone(),
                type_id: instance.type_id().to_string(),
                fields: instance.node.display_fields(),
            })
            .collect();
        Self {
            status: EngineStatus::of(engine),
            nodes,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FaultMessage {
    pub node_id: NodeId,
    pub node_name: String,
    pub message: String,
    pub trace: String,
}

impl From<&EvaluationFault> for FaultMessage {
    fn from(fault: &EvaluationFault) -> Self {
        Self {
            node_id: fault.node_id,
            node_name: fault.node_name.clone(),
            message: fault.message(),
            trace: fault.trace.clone(),
        }
    }
}

/// What the host pushes to subscribers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostMessage {
    State(StateSnapshot),
    Fault(FaultMessage),
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::node_definitions::Constant;
    use crate::plugin::registry::NodeTypeRegistry;

    #[test]
    fn test_capture_reads_display_fields() {
        let registry = NodeTypeRegistry::with_builtin_types();
        let mut engine = Engine::new();
        let id = engine
            .insert_node(Some("source"), registry.create(Constant::TYPE_ID).unwrap())
            .unwrap();

        let snapshot = StateSnapshot::capture(&engine);
        let node = snapshot.node(id).unwrap();
        assert_eq!(node.name, "source");
        assert_eq!(node.fields[0].0, "current");
        assert_eq!(node.fields[0].1, Some(Value::number(1.0)));
        assert!(!snapshot.status.running);
        assert_eq!(snapshot.status.step, 0);
    }

    #[test]
    fn test_message_json_is_tagged() {
        let message = HostMessage::Fault(FaultMessage {
            node_id: NodeId(3),
            node_name: "bad".to_string(),
            message: "boom".to_string(),
            trace: "boom".to_string(),
        });
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "fault");
        assert_eq!(json["node_id"], 3);
        assert_eq!(json["message"], "boom");
    }
}
