//! Drives a shared engine live: one compute task ticking it, one broadcast
//! task pushing snapshots to subscribers.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::config::RuntimeConfig;
use super::lock_helpers::{self, SharedEngine, with_engine};
use super::snapshot::{FaultMessage, HostMessage, StateSnapshot};
use crate::error::EngineError;
use crate::evaluation::engine::Engine;
use crate::evaluation::fault::EvaluationFault;
use crate::util::timing::RateMeter;

const MESSAGE_CAPACITY: usize = 64;
const RATE_WINDOW: Duration = Duration::from_secs(1);

pub struct Host {
    engine: SharedEngine,
    config: RuntimeConfig,
    messages: broadcast::Sender<HostMessage>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Host {
    pub fn new(mut engine: Engine, config: RuntimeConfig) -> Self {
        let config = config.sanitized();
        engine.set_speed(config.target_hz, config.max_hz);
        let (messages, _) = broadcast::channel(MESSAGE_CAPACITY);
        let (shutdown, _) = watch::channel(false);
        Self {
            engine: lock_helpers::shared(engine),
            config,
            messages,
            shutdown,
            tasks: Vec::new(),
        }
    }

    /// Handle for editing the graph or controlling the engine while the host
    /// runs.
    pub fn engine(&self) -> SharedEngine {
        SharedEngine::clone(&self.engine)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostMessage> {
        self.messages.subscribe()
    }

    /// Change the tick rate, clamped to `[1, max_hz]`.
    pub fn set_speed(&self, hz: f64) -> Result<(), EngineError> {
        let max_hz = self.config.max_hz;
        with_engine(&self.engine, |engine| {
            engine.set_speed(hz, max_hz);
            Ok(())
        })
    }

    /// Start the compute and broadcast tasks. Must be called inside a tokio
    /// runtime; a second call does nothing.
    pub fn spawn(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }
        self.tasks.push(tokio::spawn(compute_loop(
            self.engine(),
            self.config.clone(),
            self.messages.clone(),
            self.shutdown.subscribe(),
        )));
        self.tasks.push(tokio::spawn(broadcast_loop(
            self.engine(),
            self.config.clone(),
            self.messages.clone(),
            self.shutdown.subscribe(),
        )));
        info!(
            "Host started (target {} Hz, broadcast {} fps)",
            self.config.target_hz, self.config.broadcast_fps
        );
    }

    /// Signal both tasks to stop and wait for them.
    pub async fn shutdown(mut self) -> Result<(), EngineError> {
        let _ = self.shutdown.send(true);
        for task in std::mem::take(&mut self.tasks) {
            task.await
                .map_err(|e| EngineError::Runtime(format!("Host task failed: {}", e)))?;
        }
        info!("Host stopped");
        Ok(())
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

enum Tick {
    Idle,
    Stepped(f64),
    Faulted(EvaluationFault),
}

async fn compute_loop(
    engine: SharedEngine,
    config: RuntimeConfig,
    messages: broadcast::Sender<HostMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut meter = RateMeter::new(RATE_WINDOW);
    loop {
        if *shutdown.borrow() {
            break;
        }
        let outcome = with_engine(&engine, |engine| {
            if !engine.is_running() {
                meter.reset();
                engine.set_actual_hz(0.0);
                return Ok(Tick::Idle);
            }
            match engine.execute_step() {
                Ok(_) => {
                    engine.set_actual_hz(meter.record());
                    Ok(Tick::Stepped(engine.speed()))
                }
                Err(EngineError::Evaluation(fault)) => {
                    meter.reset();
                    engine.set_actual_hz(0.0);
                    Ok(Tick::Faulted(fault))
                }
                Err(other) => Err(other),
            }
        });

        let delay = match outcome {
            Ok(Tick::Idle) => Some(config.idle_poll()),
            Ok(Tick::Stepped(speed)) => config.tick_interval(speed),
            Ok(Tick::Faulted(fault)) => {
                // No subscribers is fine; the fault stays readable on the engine.
                let _ = messages.send(HostMessage::Fault(FaultMessage::from(&fault)));
                Some(config.fault_backoff())
            }
            Err(e) => {
                error!("Compute loop stopping: {}", e);
                break;
            }
        };

        match delay {
            Some(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            None => tokio::task::yield_now().await,
        }
    }
    debug!("Compute loop exited");
}

async fn broadcast_loop(
    engine: SharedEngine,
    config: RuntimeConfig,
    messages: broadcast::Sender<HostMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.broadcast_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if messages.receiver_count() == 0 {
                    continue;
                }
                match with_engine(&engine, |engine| Ok(StateSnapshot::capture(engine))) {
                    Ok(snapshot) => {
                        let _ = messages.send(HostMessage::State(snapshot));
                    }
                    Err(e) => {
                        warn!("Broadcast loop stopping: {}", e);
                        break;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!("Broadcast loop exited");
}
