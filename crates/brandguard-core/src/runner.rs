//! Guardrail Runner: the bounded generate-validate-retry loop.
//!
//! Each iteration drafts with the agent, validates the bundle's structure,
//! re-scores every channel, re-verifies every claim and then either accepts
//! or retries. Only unverified claims inject feedback into the brief; schema
//! faults and agent faults retry with the brief unchanged. Exhausting the
//! budget is a normal outcome and returns the last parsed bundle with flags.
//!
//! Iterations run strictly in sequence since each one's feedback depends on
//! the previous outcome. Within an iteration, channel scoring and claim
//! verification run concurrently.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::agent::{AgentError, AgentOutput, ContentAgent};
use crate::artifacts::write_run_artifacts;
use crate::config::RunnerConfig;
use crate::critique::CritiqueEngine;
use crate::domain::{
    AgentAudit, AuditLog, AuditRecord, ContentBundle, EventBrief, IterationVerdict, RunnerResult,
    RunnerState, ToolCall,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::validation::{extract_claims, unverified_claims, validate_bundle_schema};
use crate::verifier::ClaimVerifier;

const FEEDBACK_HEADER: &str =
    "The following claims could not be verified and must be removed or softened:";
const FEEDBACK_FOOTER: &str = "Please either remove these claims or soften them to opinions.";

/// Feedback block listing at most `max_claims` unverified claims.
pub fn feedback_block(unverified: &[String], max_claims: usize) -> String {
    let mut lines = vec![FEEDBACK_HEADER.to_string()];
    lines.extend(unverified.iter().take(max_claims).map(|c| format!("- {}", c)));
    lines.push(FEEDBACK_FOOTER.to_string());
    lines.join("\n")
}

enum AgentCall {
    Output(AgentOutput),
    Fault(String),
    Cancelled,
}

/// Resolves once `cancel` flips to `true`. A dropped sender can never cancel.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Per-run bookkeeping. Records and flags are append-only.
struct RunTracker {
    run_id: String,
    state: RunnerState,
    flags: Vec<String>,
    records: Vec<AuditRecord>,
    best: Option<ContentBundle>,
    cancelled: bool,
}

impl RunTracker {
    fn new(run_id: String) -> Self {
        Self {
            run_id,
            state: RunnerState::Drafting,
            flags: Vec::new(),
            records: Vec::new(),
            best: None,
            cancelled: false,
        }
    }

    fn transition(&mut self, to: RunnerState) {
        if self.state != to {
            obs::emit_state_transition(&self.run_id, self.state, to);
            self.state = to;
        }
    }

    fn flag(&mut self, iteration: u32, flag: String) {
        obs::emit_iteration_flagged(&self.run_id, iteration, &flag);
        self.flags.push(flag);
    }

    fn record(
        &mut self,
        iteration: u32,
        mut audit: AgentAudit,
        success: bool,
        verdict: IterationVerdict,
    ) {
        audit.complete();
        self.records.push(AuditRecord {
            iteration,
            audit,
            success,
            verdict,
        });
    }
}

pub struct GuardrailRunner {
    agent: Arc<dyn ContentAgent>,
    critique: CritiqueEngine,
    verifier: Option<ClaimVerifier>,
    config: RunnerConfig,
}

impl GuardrailRunner {
    pub fn new(agent: Arc<dyn ContentAgent>, config: RunnerConfig) -> Self {
        Self {
            agent,
            critique: CritiqueEngine::default(),
            verifier: None,
            config,
        }
    }

    pub fn with_critique(mut self, critique: CritiqueEngine) -> Self {
        self.critique = critique;
        self
    }

    /// Attach a verifier. Without one, the agent's claims table is trusted as-is.
    pub fn with_verifier(mut self, verifier: ClaimVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub async fn run(&self, brief: EventBrief) -> RunnerResult {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_with_cancel(brief, cancel_rx).await
    }

    /// Run until accepted, exhausted, or `cancel` becomes `true`.
    ///
    /// Cancellation aborts the in-flight agent call; audit records of earlier
    /// iterations are kept.
    pub async fn run_with_cancel(
        &self,
        brief: EventBrief,
        cancel: watch::Receiver<bool>,
    ) -> RunnerResult {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id);
        self.drive(run_id, brief, cancel).instrument(span).await
    }

    async fn drive(
        &self,
        run_id: String,
        mut brief: EventBrief,
        mut cancel: watch::Receiver<bool>,
    ) -> RunnerResult {
        let started = Instant::now();
        let started_at = Utc::now();
        METRICS.inc_runs_started();
        obs::emit_run_started(&run_id, self.agent.name(), self.config.max_iterations);

        let mut run = RunTracker::new(run_id);

        for i in 0..self.config.max_iterations {
            let iteration = i + 1;
            if *cancel.borrow() {
                run.cancelled = true;
                break;
            }

            run.transition(RunnerState::Drafting);
            obs::emit_iteration_started(&run.run_id, iteration);
            METRICS.inc_iterations();

            let mut output = match self.call_agent(&brief, &mut cancel).await {
                AgentCall::Output(output) => output,
                AgentCall::Fault(message) => {
                    METRICS.inc_agent_faults();
                    run.flag(iteration, format!("iteration_{}_error: {}", i, message));
                    let mut audit = AgentAudit::started_now();
                    audit.record_message(message);
                    run.record(iteration, audit, false, IterationVerdict::AgentFault);
                    run.transition(RunnerState::Retrying);
                    continue;
                }
                AgentCall::Cancelled => {
                    let mut audit = AgentAudit::started_now();
                    audit.record_message("agent call cancelled");
                    run.record(iteration, audit, false, IterationVerdict::Cancelled);
                    run.cancelled = true;
                    break;
                }
            };

            if !output.success {
                METRICS.inc_agent_faults();
                run.flag(iteration, format!("iteration_{}_agent_failed", i));
                run.record(iteration, output.audit, false, IterationVerdict::AgentFault);
                run.transition(RunnerState::Retrying);
                continue;
            }

            let resolved = match output.bundle.take() {
                Some(bundle) => Some(bundle),
                None => self.load_fallback(&mut output.audit),
            };
            let Some(mut bundle) = resolved else {
                run.flag(iteration, format!("iteration_{}_no_output", i));
                run.record(iteration, output.audit, true, IterationVerdict::NoOutput);
                run.transition(RunnerState::Retrying);
                continue;
            };
            run.best = Some(bundle.clone());
            run.transition(RunnerState::Validating);

            if let Err(violation) = validate_bundle_schema(&bundle) {
                output.audit.record_tool(
                    ToolCall::new("guardrail.schema_validation", "bundle")
                        .with_response(format!("invalid: {}", violation)),
                );
                run.flag(
                    iteration,
                    format!("iteration_{}_schema_invalid: {}", i, violation),
                );
                run.record(iteration, output.audit, true, IterationVerdict::SchemaInvalid);
                run.transition(RunnerState::Retrying);
                continue;
            }
            output.audit.record_tool(
                ToolCall::new("guardrail.schema_validation", "bundle").with_response("valid"),
            );

            self.evaluate(&mut bundle, &output.retrieved_chunk_ids, &mut output.audit)
                .await;
            run.best = Some(bundle.clone());

            let unverified = unverified_claims(&bundle);
            obs::emit_claims_verified(
                &run.run_id,
                iteration,
                bundle.claims_table.as_ref().map_or(0, Vec::len),
                unverified.len(),
            );

            if !unverified.is_empty() {
                run.flag(
                    iteration,
                    format!("iteration_{}_unverified_claims: {}", i, unverified.len()),
                );
                let block = feedback_block(&unverified, self.config.max_feedback_claims);
                let appended = brief.add_feedback(block);
                output.audit.record_tool(
                    ToolCall::new(
                        "guardrail.feedback",
                        format!("{} unverified claims", unverified.len()),
                    )
                    .with_response(if appended { "appended" } else { "duplicate, skipped" }),
                );
                run.record(iteration, output.audit, true, IterationVerdict::Unverified);
                run.transition(RunnerState::Retrying);
                continue;
            }

            run.transition(RunnerState::Accepted);
            bundle.iterations = Some(iteration);
            bundle.flags.clear();
            run.record(iteration, output.audit, true, IterationVerdict::Accepted);
            return self.finish(run, Some(bundle), true, iteration, started, started_at);
        }

        if run.cancelled {
            run.flags.push("cancelled".to_string());
            run.transition(RunnerState::Cancelled);
        } else {
            run.flags.push("max_iterations_reached".to_string());
            run.transition(RunnerState::Exhausted);
        }

        let iterations = run.records.len() as u32;
        let mut best = run.best.take();
        if let Some(bundle) = best.as_mut() {
            let unsupported = bundle.unsupported_count();
            if unsupported > 0 {
                run.flags
                    .push(format!("unsupported_claims_present: {}", unsupported));
            }
            bundle.flags = run.flags.clone();
            bundle.iterations = Some(iterations);
        }

        self.finish(run, best, false, iterations, started, started_at)
    }

    async fn call_agent(
        &self,
        brief: &EventBrief,
        cancel: &mut watch::Receiver<bool>,
    ) -> AgentCall {
        let timeout_ms = self.config.agent_timeout_ms;
        let call = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.agent.generate(brief),
        );

        tokio::select! {
            biased;
            _ = cancelled(cancel) => AgentCall::Cancelled,
            result = call => match result {
                Err(_) => AgentCall::Fault(AgentError::Timeout { timeout_ms }.to_string()),
                Ok(Err(AgentError::Cancelled)) => AgentCall::Cancelled,
                Ok(Err(e)) => AgentCall::Fault(e.to_string()),
                Ok(Ok(output)) => AgentCall::Output(output),
            },
        }
    }

    /// Read the bundle the agent may have written to its known output location.
    fn load_fallback(&self, audit: &mut AgentAudit) -> Option<ContentBundle> {
        let path = self.config.fallback_output.as_ref()?;
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no fallback bundle");
                return None;
            }
        };
        match serde_json::from_slice::<ContentBundle>(&raw) {
            Ok(bundle) => {
                audit.record_tool(
                    ToolCall::new("guardrail.fallback_output", path.display().to_string())
                        .with_response("loaded"),
                );
                Some(bundle)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "fallback bundle is not valid JSON");
                None
            }
        }
    }

    /// Replace scorecards and the claims table with host-computed values.
    async fn evaluate(&self, bundle: &mut ContentBundle, retrieved: &[String], audit: &mut AgentAudit) {
        let content = bundle.content.clone().unwrap_or_default();

        let mut claims = bundle.claim_texts();
        if self.verifier.is_some() && self.config.extract_undeclared_claims {
            for extracted in extract_claims(bundle) {
                if !claims.contains(&extracted) {
                    claims.push(extracted);
                }
            }
        }

        let mut seen = HashSet::new();
        let candidates: Vec<String> = retrieved
            .iter()
            .cloned()
            .chain(
                bundle
                    .claims_table
                    .iter()
                    .flatten()
                    .filter_map(|c| c.source_id.clone()),
            )
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let scoring = async {
            content
                .iter()
                .map(|(channel, draft)| {
                    let report = self.critique.critique(
                        channel,
                        draft.title(),
                        draft.body.as_deref().unwrap_or(""),
                        draft.cta.as_deref().unwrap_or(""),
                        &claims,
                    );
                    (channel.clone(), report)
                })
                .collect::<Vec<_>>()
        };
        let verifying = async {
            match &self.verifier {
                Some(verifier) => Some(verifier.verify(&claims, &candidates).await),
                None => None,
            }
        };
        let (reports, verified) = futures::join!(scoring, verifying);

        let scorecards = bundle.scorecard.get_or_insert_with(Default::default);
        scorecards.clear();
        for (channel, report) in reports {
            audit.record_tool(
                ToolCall::new("guardrail.critique", format!("channel={}", channel))
                    .with_response(report.feedback.clone()),
            );
            scorecards.insert(channel, report.scorecard());
        }

        if let Some(table) = verified {
            let unsupported = table.iter().filter(|c| !c.supported).count();
            audit.record_tool(
                ToolCall::new(
                    "guardrail.verify_claims",
                    format!("{} claims, {} candidates", claims.len(), candidates.len()),
                )
                .with_response(format!("{} unsupported", unsupported)),
            );
            bundle.claims_table = Some(table);
        }
    }

    fn finish(
        &self,
        run: RunTracker,
        bundle: Option<ContentBundle>,
        success: bool,
        iterations: u32,
        started: Instant,
        started_at: DateTime<Utc>,
    ) -> RunnerResult {
        let RunTracker {
            run_id,
            flags,
            records,
            ..
        } = run;

        // The audit keeps every flag; an accepted result reports none.
        let audit_log = AuditLog::combine(&run_id, started_at, records, success, flags.clone());
        let flags = if success { Vec::new() } else { flags };

        let mut error = None;
        if let Some(dir) = &self.config.artifacts_dir {
            if let Err(e) = write_run_artifacts(dir, &run_id, bundle.as_ref(), &audit_log) {
                obs::emit_artifact_error(&run_id, &e);
                error = Some(format!("artifact persistence failed: {}", e));
            }
        }

        obs::emit_run_finished(
            &run_id,
            started.elapsed().as_millis() as u64,
            iterations,
            success,
        );

        RunnerResult {
            run_id,
            success,
            result: bundle,
            iterations,
            flags,
            audit_log,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_block_caps_claims() {
        let claims: Vec<String> = (1..=7).map(|n| format!("claim {}", n)).collect();
        let block = feedback_block(&claims, 5);
        assert!(block.starts_with(FEEDBACK_HEADER));
        assert!(block.ends_with(FEEDBACK_FOOTER));
        assert!(block.contains("- claim 5"));
        assert!(!block.contains("- claim 6"));
    }
}
