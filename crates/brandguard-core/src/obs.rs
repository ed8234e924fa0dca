//! Structured observability hooks for guardrail run lifecycle events.
//!
//! Events are emitted at `info!` level with an `event` field so they can be
//! filtered in JSON log pipelines.

use tracing::info;

use crate::domain::RunnerState;

/// RAII guard that enters a run-scoped span. For synchronous code only; async
/// code should attach [`run_span`] with `Instrument`.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// A span tagged with `run_id`.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("brandguard.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, agent_name: &str, max_iterations: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        agent_name = %agent_name,
        max_iterations = max_iterations,
    );
}

pub fn emit_iteration_started(run_id: &str, iteration: u32) {
    info!(event = "iteration.started", run_id = %run_id, iteration = iteration);
}

pub fn emit_state_transition(run_id: &str, from: RunnerState, to: RunnerState) {
    info!(
        event = "runner.transition",
        run_id = %run_id,
        from = from.as_str(),
        to = to.as_str(),
    );
}

/// Emit event: an iteration was flagged (warning level).
pub fn emit_iteration_flagged(run_id: &str, iteration: u32, flag: &str) {
    tracing::warn!(event = "iteration.flagged", run_id = %run_id, iteration = iteration, flag = %flag);
}

pub fn emit_claims_verified(run_id: &str, iteration: u32, total: usize, unsupported: usize) {
    info!(
        event = "claims.verified",
        run_id = %run_id,
        iteration = iteration,
        total = total,
        unsupported = unsupported,
    );
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, iterations: u32, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        iterations = iterations,
        success = success,
    );
}

/// Emit event: artifact persistence failed (warning level).
pub fn emit_artifact_error(run_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "run.artifact_error", run_id = %run_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
        emit_iteration_started("test-run-id", 1);
    }
}
