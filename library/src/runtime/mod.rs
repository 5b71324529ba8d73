//! Host runtime: configuration, shared-engine locking, snapshots, and the
//! compute/broadcast tasks that drive an engine live.

pub mod config;
pub mod host;
pub mod lock_helpers;
pub mod snapshot;

pub use config::RuntimeConfig;
pub use host::Host;
pub use lock_helpers::{SharedEngine, with_engine};
pub use snapshot::{EngineStatus, FaultMessage, HostMessage, NodeSnapshot, StateSnapshot};
