//! Node type catalog: definitions, the node capability trait, and the
//! registry that maps type ids to constructors.

pub mod node_definitions;
pub mod node_types;
pub mod registry;
pub mod traits;

pub use node_types::{FieldDefinition, NodeCategory, NodeTypeDefinition};
pub use registry::NodeTypeRegistry;
pub use traits::{Node, PortState};
