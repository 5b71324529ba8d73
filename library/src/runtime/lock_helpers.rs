//! Shared-engine handle with consistent lock error handling.

use std::sync::{Arc, Mutex};

use crate::error::EngineError;
use crate::evaluation::engine::Engine;

/// The one engine shared by the host tasks and any caller editing the graph.
pub type SharedEngine = Arc<Mutex<Engine>>;

pub fn shared(engine: Engine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

/// Run `f` with exclusive access to the engine.
///
/// Every tick, propagation, edit and snapshot goes through here, so none of
/// them ever overlap.
pub fn with_engine<F, R>(engine: &SharedEngine, f: F) -> Result<R, EngineError>
where
    F: FnOnce(&mut Engine) -> Result<R, EngineError>,
{
    let mut guard = engine
        .lock()
        .map_err(|_| EngineError::Runtime("Lock Poisoned".to_string()))?;
    f(&mut guard)
}
