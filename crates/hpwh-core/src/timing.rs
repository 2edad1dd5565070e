//! Lightweight performance timing utilities.
//!
//! Disabled by default; set `HPWH_TIMING=1` (or call `enable_timing`) to turn
//! it on for a process. Meant for comparing driver/stepper overhead across
//! model sizes, not for profiling individual physics calls.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("HPWH_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and log the result via `tracing` if enabled.
    pub fn stop_and_log(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            tracing::debug!(label, elapsed_s = elapsed, "timing");
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls, e.g.
/// every `Hpwh::step` in a multi-year run.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    /// Create a new accumulating timer.
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    /// Reset the timer.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Performance statistics for a single simulation run, surfaced by the
/// driver when `HPWH_TIMING` is set.
#[derive(Default)]
pub struct PerfStats {
    pub model_build_time_s: f64,
    pub step_total_time_s: f64,
    pub step_count: u64,
    pub rating_total_time_s: f64,
    pub csv_write_time_s: f64,
}

impl PerfStats {
    /// Log a formatted summary of the statistics via `tracing`.
    pub fn log_summary(&self) {
        if !is_enabled() {
            return;
        }

        tracing::info!(
            model_build_time_s = self.model_build_time_s,
            step_total_time_s = self.step_total_time_s,
            step_count = self.step_count,
            avg_step_time_s = self.average_step_time_s(),
            rating_total_time_s = self.rating_total_time_s,
            csv_write_time_s = self.csv_write_time_s,
            "simulation performance summary"
        );
    }

    fn average_step_time_s(&self) -> f64 {
        if self.step_count > 0 {
            self.step_total_time_s / self.step_count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let t = AccumulatingTimer::new();
        t.record(1.0);
        t.record(3.0);
        assert_eq!(t.count(), 2);
        assert!((t.average_seconds() - 2.0).abs() < 1e-12);
    }
}
