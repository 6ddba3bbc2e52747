//! Global atomic counters for Seatwise.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before a command exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free counters.
pub struct Metrics {
    violations_recorded: AtomicU64,
    arrangements_generated: AtomicU64,
    generation_failures: AtomicU64,
    budget_exhaustions: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            violations_recorded: AtomicU64::new(0),
            arrangements_generated: AtomicU64::new(0),
            generation_failures: AtomicU64::new(0),
            budget_exhaustions: AtomicU64::new(0),
        }
    }

    pub fn inc_violations(&self) {
        self.violations_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "violations_recorded", "counter incremented");
    }

    pub fn inc_arrangements(&self) {
        self.arrangements_generated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "arrangements_generated", "counter incremented");
    }

    pub fn inc_generation_failures(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "generation_failures", "counter incremented");
    }

    pub fn inc_budget_exhaustions(&self) {
        self.budget_exhaustions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "budget_exhaustions", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            violations_recorded = self.violations_recorded(),
            arrangements_generated = self.arrangements_generated(),
            generation_failures = self.generation_failures(),
            budget_exhaustions = self.budget_exhaustions(),
        );
    }

    pub fn violations_recorded(&self) -> u64 {
        self.violations_recorded.load(Ordering::Relaxed)
    }

    pub fn arrangements_generated(&self) -> u64 {
        self.arrangements_generated.load(Ordering::Relaxed)
    }

    pub fn generation_failures(&self) -> u64 {
        self.generation_failures.load(Ordering::Relaxed)
    }

    pub fn budget_exhaustions(&self) -> u64 {
        self.budget_exhaustions.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.violations_recorded.store(0, Ordering::Relaxed);
        self.arrangements_generated.store(0, Ordering::Relaxed);
        self.generation_failures.store(0, Ordering::Relaxed);
        self.budget_exhaustions.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.violations_recorded(), 0);
        m.inc_violations();
        m.inc_violations();
        assert_eq!(m.violations_recorded(), 2);

        m.inc_arrangements();
        assert_eq!(m.arrangements_generated(), 1);

        m.inc_generation_failures();
        m.inc_budget_exhaustions();
        m.inc_budget_exhaustions();
        assert_eq!(m.generation_failures(), 1);
        assert_eq!(m.budget_exhaustions(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_violations();
        m.inc_arrangements();
        m.inc_generation_failures();
        m.inc_budget_exhaustions();
        m.reset();
        assert_eq!(m.violations_recorded(), 0);
        assert_eq!(m.arrangements_generated(), 0);
        assert_eq!(m.generation_failures(), 0);
        assert_eq!(m.budget_exhaustions(), 0);
    }
}
