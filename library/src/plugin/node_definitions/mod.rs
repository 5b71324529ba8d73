//! Built-in node types.
//!
//! These cover the basic signal flow (sources, arithmetic, running averages,
//! sinks). Hosts register their own types alongside them.

/// Forward the port half of `Node` to a `ports: PortState` field.
macro_rules! forward_ports {
    () => {
        fn definition(&self) -> &std::sync::Arc<crate::plugin::node_types::NodeTypeDefinition> {
            self.ports.definition()
        }

        fn set_input(&mut self, port: &str, value: Option<crate::model::value::Value>) {
            self.ports.set_input(port, value);
        }

        fn input(&self, port: &str) -> Option<crate::model::value::Value> {
            self.ports.input(port).cloned()
        }

        fn output(&self, port: &str) -> Option<crate::model::value::Value> {
            self.ports.output(port).cloned()
        }
    };
}

mod generators;
mod learning;
mod math;
mod utility;

pub use generators::{Constant, Counter};
pub use learning::MovingAverage;
pub use math::{Add, Scale};
pub use utility::Display;

use crate::model::connection::{PortDataType, PortDefinition};
use crate::model::value::Value;
use crate::plugin::node_types::{
    FieldDefinition, NodeCategory, NodeTypeDefinition, PropertyDefinition,
};
use crate::plugin::registry::NodeTypeRegistry;

/// Register all built-in node types.
pub(crate) fn register_builtin_types(registry: &mut NodeTypeRegistry) {
    generators::register(registry);
    math::register(registry);
    learning::register(registry);
    utility::register(registry);
}

// ---------------------------------------------------------------------------
// Definition helpers
// ---------------------------------------------------------------------------

fn inp(name: &str, display: &str, dt: PortDataType) -> PortDefinition {
    PortDefinition::new(name, display, dt)
}

fn out(name: &str, display: &str, dt: PortDataType) -> PortDefinition {
    PortDefinition::new(name, display, dt)
}

fn node(type_id: &str, name: &str, cat: NodeCategory) -> NodeTypeDefinition {
    NodeTypeDefinition::new(type_id, name, cat)
}

fn field(name: &str, display: &str) -> FieldDefinition {
    FieldDefinition::new(name, display)
}

fn prop(name: &str, display: &str, default: Value) -> PropertyDefinition {
    PropertyDefinition::new(name, display, default)
}
