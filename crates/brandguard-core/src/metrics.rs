//! Global atomic counters for BrandGuard runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single `info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    runs_started: AtomicU64,
    iterations_executed: AtomicU64,
    claims_verified: AtomicU64,
    claims_unsupported: AtomicU64,
    agent_faults: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            iterations_executed: AtomicU64::new(0),
            claims_verified: AtomicU64::new(0),
            claims_unsupported: AtomicU64::new(0),
            agent_faults: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_started", "counter incremented");
    }

    pub fn inc_iterations(&self) {
        self.iterations_executed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "iterations_executed", "counter incremented");
    }

    pub fn add_claims_verified(&self, n: u64) {
        self.claims_verified.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_claims_unsupported(&self, n: u64) {
        self.claims_unsupported.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_agent_faults(&self) {
        self.agent_faults.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_faults", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            iterations_executed = self.iterations_executed(),
            claims_verified = self.claims_verified(),
            claims_unsupported = self.claims_unsupported(),
            agent_faults = self.agent_faults(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn iterations_executed(&self) -> u64 {
        self.iterations_executed.load(Ordering::Relaxed)
    }

    pub fn claims_verified(&self) -> u64 {
        self.claims_verified.load(Ordering::Relaxed)
    }

    pub fn claims_unsupported(&self) -> u64 {
        self.claims_unsupported.load(Ordering::Relaxed)
    }

    pub fn agent_faults(&self) -> u64 {
        self.agent_faults.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_started.store(0, Ordering::Relaxed);
        self.iterations_executed.store(0, Ordering::Relaxed);
        self.claims_verified.store(0, Ordering::Relaxed);
        self.claims_unsupported.store(0, Ordering::Relaxed);
        self.agent_faults.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_runs_started();
        m.inc_iterations();
        m.inc_iterations();
        m.add_claims_verified(4);
        m.add_claims_unsupported(1);
        m.inc_agent_faults();

        assert_eq!(m.runs_started(), 1);
        assert_eq!(m.iterations_executed(), 2);
        assert_eq!(m.claims_verified(), 4);
        assert_eq!(m.claims_unsupported(), 1);
        assert_eq!(m.agent_faults(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_runs_started();
        m.add_claims_verified(3);
        m.inc_agent_faults();
        m.reset();
        assert_eq!(m.runs_started(), 0);
        assert_eq!(m.claims_verified(), 0);
        assert_eq!(m.agent_faults(), 0);
    }
}
