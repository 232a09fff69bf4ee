//! Named accumulating timers for a breakdown of where a run spends its time.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use tracing::debug;

/// The timer every percentage in [`TimeLog::report`] is relative to.
pub const TOTAL: &str = "Total";

#[derive(Debug, Default)]
pub struct TimeLog {
    enabled: bool,
    totals: HashMap<String, Duration>,
    running: HashMap<String, Instant>,
}

impl TimeLog {
    /// A disabled log ignores every call.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start(&mut self, name: &str) {
        if self.enabled {
            self.running.insert(name.to_string(), Instant::now());
        }
    }

    pub fn stop(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        match self.running.remove(name) {
            Some(started) => self.add(name, started.elapsed()),
            None => debug!(timer = name, "stopped a timer that was not running"),
        }
    }

    /// Adds an externally measured span to `name`.
    pub fn add(&mut self, name: &str, elapsed: Duration) {
        if self.enabled {
            *self.totals.entry(name.to_string()).or_default() += elapsed;
        }
    }

    pub fn total(&self, name: &str) -> Option<Duration> {
        self.totals.get(name).copied()
    }

    /// One line per timer, longest first. Without a `Total` timer the
    /// percentages are relative to the sum of all timers.
    pub fn report(&self) -> String {
        if !self.enabled {
            return String::new();
        }
        let mut timers: Vec<(&String, &Duration)> = self.totals.iter().collect();
        timers.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let base = self
            .total(TOTAL)
            .unwrap_or_else(|| self.totals.values().sum())
            .as_secs_f64();
        let mut out = String::from("Timing breakdown:\n");
        for (name, elapsed) in timers {
            let secs = elapsed.as_secs_f64();
            let percent = if base > 0.0 { 100.0 * secs / base } else { 0.0 };
            let _ = writeln!(out, "{secs:9.2} sec, {percent:5.1}%: {name}");
        }
        out
    }
}
