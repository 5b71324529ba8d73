//! Node type definitions for the data-flow graph.

use std::collections::HashMap;

use crate::model::connection::PortDefinition;
use crate::model::value::Value;

/// Category of a node type, used to group the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeCategory {
    /// Signal sources with no inputs (constant, counter, noise)
    Generator,
    /// Arithmetic transforms (scale, add)
    Math,
    /// Stateful learning or accumulation rules
    Learning,
    /// Sinks and helpers (display, pass-through)
    Utility,
    /// Host-defined custom category
    Custom,
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeCategory::Generator => "Generator",
            NodeCategory::Math => "Math",
            NodeCategory::Learning => "Learning",
            NodeCategory::Utility => "Utility",
            NodeCategory::Custom => "Custom",
        };
        write!(f, "{}", s)
    }
}

/// A named, non-port field of a node: a display output or a persisted store.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub display_name: String,
}

impl FieldDefinition {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// A user-tunable property with its default value.
#[derive(Debug, Clone)]
pub struct PropertyDefinition {
    pub name: String,
    pub display_name: String,
    pub default_value: Value,
}

impl PropertyDefinition {
    pub fn new(name: &str, display_name: &str, default_value: Value) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            default_value,
        }
    }
}

/// Definition of a node type, registered in the `NodeTypeRegistry`.
///
/// Describes what a node of this type looks like: its ports, properties,
/// display fields and persisted fields. The port name → slot tables are
/// built here, once per type, so instances never look ports up by scanning.
#[derive(Debug, Clone)]
pub struct NodeTypeDefinition {
    /// Unique type identifier (e.g. "math.scale")
    pub type_id: String,
    /// Human-readable name, also the default instance name
    pub display_name: String,
    pub category: NodeCategory,
    pub description: String,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
    pub properties: Vec<PropertyDefinition>,
    /// Externally observable fields (disjoint from output ports)
    pub displays: Vec<FieldDefinition>,
    /// Internal state carried across node replacement
    pub persisted: Vec<FieldDefinition>,
    /// Named one-shot commands (e.g. "reinit")
    pub actions: Vec<FieldDefinition>,
    input_slots: HashMap<String, usize>,
    output_slots: HashMap<String, usize>,
}

impl NodeTypeDefinition {
    pub fn new(type_id: &str, display_name: &str, category: NodeCategory) -> Self {
        Self {
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            category,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: Vec::new(),
            displays: Vec::new(),
            persisted: Vec::new(),
            actions: Vec::new(),
            input_slots: HashMap::new(),
            output_slots: HashMap::new(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.input_slots = slot_table(&inputs);
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortDefinition>) -> Self {
        self.output_slots = slot_table(&outputs);
        self.outputs = outputs;
        self
    }

    pub fn with_properties(mut self, props: Vec<PropertyDefinition>) -> Self {
        self.properties = props;
        self
    }

    pub fn with_displays(mut self, displays: Vec<FieldDefinition>) -> Self {
        self.displays = displays;
        self
    }

    pub fn with_persisted(mut self, persisted: Vec<FieldDefinition>) -> Self {
        self.persisted = persisted;
        self
    }

    pub fn with_actions(mut self, actions: Vec<FieldDefinition>) -> Self {
        self.actions = actions;
        self
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a.name == name)
    }

    pub fn input_slot(&self, name: &str) -> Option<usize> {
        self.input_slots.get(name).copied()
    }

    pub fn output_slot(&self, name: &str) -> Option<usize> {
        self.output_slots.get(name).copied()
    }

    pub fn input(&self, name: &str) -> Option<&PortDefinition> {
        self.input_slot(name).map(|i| &self.inputs[i])
    }

    pub fn output(&self, name: &str) -> Option<&PortDefinition> {
        self.output_slot(name).map(|i| &self.outputs[i])
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Names of every field that survives node replacement: properties first,
    /// then persisted stores.
    pub fn transferable_fields(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.persisted.iter().map(|f| f.name.as_str()))
    }

    pub fn declares_field(&self, name: &str) -> bool {
        self.transferable_fields().any(|f| f == name)
    }
}

fn slot_table(ports: &[PortDefinition]) -> HashMap<String, usize> {
    ports
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.clone(), i))
        .collect()
}
