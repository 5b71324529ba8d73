use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tuning of the host loops. Every field has a default, so a partial file is
/// fine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Initial tick rate in Hz.
    pub target_hz: f64,
    /// Upper bound for the tick rate; at or above it the compute task does
    /// not sleep between ticks.
    pub max_hz: f64,
    /// Snapshot broadcast rate in Hz.
    pub broadcast_fps: f64,
    /// Poll interval of the compute task while the engine is stopped.
    pub idle_poll_ms: u64,
    /// Pause after a tick fault before the compute task polls again.
    pub fault_backoff_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_hz: 10.0,
            max_hz: 300.0,
            broadcast_fps: 60.0,
            idle_poll_ms: 50,
            fault_backoff_ms: 100,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: RuntimeConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Replace out-of-range values: `max_hz >= 1`, `target_hz` within
    /// `[1, max_hz]`, positive broadcast rate and idle poll.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let max_hz = if self.max_hz.is_finite() && self.max_hz >= 1.0 {
            self.max_hz
        } else {
            warn!("Invalid max_hz {}, using {}", self.max_hz, defaults.max_hz);
            defaults.max_hz
        };
        let target_hz = if self.target_hz.is_finite() {
            self.target_hz.clamp(1.0, max_hz)
        } else {
            warn!("Invalid target_hz {}, using {}", self.target_hz, defaults.target_hz);
            defaults.target_hz.min(max_hz)
        };
        let broadcast_fps = if self.broadcast_fps.is_finite() && self.broadcast_fps > 0.0 {
            self.broadcast_fps
        } else {
            warn!("Invalid broadcast_fps {}, using {}", self.broadcast_fps, defaults.broadcast_fps);
            defaults.broadcast_fps
        };
        Self {
            target_hz,
            max_hz,
            broadcast_fps,
            idle_poll_ms: self.idle_poll_ms.max(1),
            fault_backoff_ms: self.fault_backoff_ms,
        }
    }

    /// Pause between ticks at `speed` Hz, or `None` to run flat out.
    pub fn tick_interval(&self, speed: f64) -> Option<Duration> {
        if speed >= self.max_hz || speed <= 0.0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / speed))
        }
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.broadcast_fps.max(f64::MIN_POSITIVE))
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn fault_backoff(&self) -> Duration {
        Duration::from_millis(self.fault_backoff_ms)
    }
}
