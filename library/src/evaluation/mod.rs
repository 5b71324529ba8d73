//! Dataflow evaluation.
//!
//! The [`engine::Engine`] drives ticks and out-of-tick propagation over the
//! graph registry, writing node outputs to the [`signals::SignalStore`].
//! Node failures are contained by [`fault`].

pub mod engine;
pub mod fault;
pub mod signals;
