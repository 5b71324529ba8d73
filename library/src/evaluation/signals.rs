//! Signal store: last value produced on every output port.

use std::collections::HashMap;

use crate::model::connection::SignalKey;
use crate::model::node::NodeId;
use crate::model::value::Value;

/// One current value per (node, output port). Entries are overwritten in
/// place and never versioned.
///
/// The store owns its values: a producer hands over its own copy on write and
/// consumers receive clones on read, so no later mutation by either side can
/// reach a value already stored.
#[derive(Debug, Default, Clone)]
pub struct SignalStore {
    signals: HashMap<SignalKey, Value>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &SignalKey) -> Option<&Value> {
        self.signals.get(key)
    }

    pub fn write(&mut self, key: SignalKey, value: Value) {
        self.signals.insert(key, value);
    }

    pub fn remove(&mut self, key: &SignalKey) -> Option<Value> {
        self.signals.remove(key)
    }

    /// Drop every signal produced by `node_id`.
    pub fn remove_node(&mut self, node_id: NodeId) {
        self.signals.retain(|key, _| key.node_id != node_id);
    }

    /// True if `node_id` has produced at least one signal.
    pub fn has_signals(&self, node_id: NodeId) -> bool {
        self.signals.keys().any(|key| key.node_id == node_id)
    }

    pub fn keys_for(&self, node_id: NodeId) -> Vec<SignalKey> {
        let mut keys: Vec<SignalKey> = self
            .signals
            .keys()
            .filter(|key| key.node_id == node_id)
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
