//! Node type registry: type id → definition + constructor.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::error::EngineError;
use crate::plugin::node_types::{NodeCategory, NodeTypeDefinition};
use crate::plugin::traits::Node;

/// Constructor for a node type. Receives the shared type definition so every
/// instance of one type points at the same slot tables.
pub type NodeFactory = Arc<dyn Fn(Arc<NodeTypeDefinition>) -> Box<dyn Node> + Send + Sync>;

struct RegisteredType {
    definition: Arc<NodeTypeDefinition>,
    factory: NodeFactory,
}

/// Explicit catalog of node types, filled at startup.
#[derive(Default)]
pub struct NodeTypeRegistry {
    types: BTreeMap<String, RegisteredType>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the built-in node types.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        crate::plugin::node_definitions::register_builtin_types(&mut registry);
        registry
    }

    /// Register (or re-register) a node type. Returns the shared definition.
    pub fn register<F>(
        &mut self,
        definition: NodeTypeDefinition,
        factory: F,
    ) -> Arc<NodeTypeDefinition>
    where
        F: Fn(Arc<NodeTypeDefinition>) -> Box<dyn Node> + Send + Sync + 'static,
    {
        let definition = Arc::new(definition);
        debug!(
            "NodeTypeRegistry: registering '{}' ({})",
            definition.type_id, definition.category
        );
        self.types.insert(
            definition.type_id.clone(),
            RegisteredType {
                definition: Arc::clone(&definition),
                factory: Arc::new(factory),
            },
        );
        definition
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn definition(&self, type_id: &str) -> Option<&Arc<NodeTypeDefinition>> {
        self.types.get(type_id).map(|t| &t.definition)
    }

    /// All registered definitions, ordered by type id.
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<NodeTypeDefinition>> {
        self.types.values().map(|t| &t.definition)
    }

    /// Construct a fresh instance of `type_id`.
    pub fn create(&self, type_id: &str) -> Result<Box<dyn Node>, EngineError> {
        let entry = self
            .types
            .get(type_id)
            .ok_or_else(|| EngineError::UnknownNodeType(type_id.to_string()))?;
        Ok((entry.factory)(Arc::clone(&entry.definition)))
    }

    /// Type ids grouped by category, for building an editor palette.
    pub fn palette(&self) -> BTreeMap<NodeCategory, Vec<String>> {
        let mut palette: BTreeMap<NodeCategory, Vec<String>> = BTreeMap::new();
        for def in self.definitions() {
            palette
                .entry(def.category)
                .or_default()
                .push(def.type_id.clone());
        }
        palette
    }
}
