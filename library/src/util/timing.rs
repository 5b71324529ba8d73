use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{self, Level};

/// Logs how long a scope took when dropped.
pub struct ScopedTimer {
    label: Option<String>,
    start: Instant,
}

impl ScopedTimer {
    /// Debug-level timer whose label is only built when debug logging is on.
    pub fn debug_lazy<F>(label_gen: F) -> Self
    where
        F: FnOnce() -> String,
    {
        Self {
            label: log::log_enabled!(Level::Debug).then(label_gen),
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(label) = &self.label {
            let micros = self.start.elapsed().as_micros();
            log::debug!("{} took {:.3} ms", label, micros as f64 / 1000.0);
        }
    }
}

/// Measures an event rate over a sliding window of recent timestamps.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            stamps: VecDeque::new(),
        }
    }

    pub fn record(&mut self) -> f64 {
        self.record_at(Instant::now())
    }

    /// Record an event at `now` and return the rate in Hz.
    ///
    /// The rate is (events - 1) over the span between the oldest and newest
    /// stamp still in the window; a single event yields 0.
    pub fn record_at(&mut self, now: Instant) -> f64 {
        self.stamps.push_back(now);
        while let Some(oldest) = self.stamps.front() {
            if now.duration_since(*oldest) > self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
        self.rate()
    }

    pub fn rate(&self) -> f64 {
        match (self.stamps.front(), self.stamps.back()) {
            (Some(first), Some(last)) if self.stamps.len() > 1 => {
                let span = last.duration_since(*first).as_secs_f64();
                if span > 0.0 {
                    (self.stamps.len() - 1) as f64 / span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.stamps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_regular_events() {
        let mut meter = RateMeter::new(Duration::from_secs(1));
        let start = Instant::now();
        for i in 0..5 {
            meter.record_at(start + Duration::from_millis(100 * i));
        }
        assert!((meter.rate() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_old_events_leave_window() {
        let mut meter = RateMeter::new(Duration::from_millis(500));
        let start = Instant::now();
        meter.record_at(start);
        meter.record_at(start + Duration::from_millis(100));
        let hz = meter.record_at(start + Duration::from_secs(2));
        assert_eq!(hz, 0.0);
    }

    #[test]
    fn test_single_event_has_no_rate() {
        let mut meter = RateMeter::new(Duration::from_secs(1));
        assert_eq!(meter.record(), 0.0);
        meter.reset();
        assert_eq!(meter.rate(), 0.0);
    }
}
