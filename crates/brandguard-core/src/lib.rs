//! BrandGuard Core: guardrails for generated marketing copy
//!
//! This crate validates what a generative content agent produces before it
//! is released. It scores drafts, attributes factual claims to source
//! chunks, and bounds the number of corrective retries.
//!
//! ## Key Components
//!
//! - `CritiqueEngine`: deterministic and heuristic per-channel scoring
//! - `ClaimVerifier`: similarity-based claim attribution with quoted spans
//! - `GuardrailRunner`: bounded generate-validate-retry loop with feedback
//! - `ContentAgent`: port for the external generative agent
//! - `artifacts`: digest-verified persistence of bundles and audit logs

pub mod agent;
pub mod analysis;
pub mod artifacts;
pub mod config;
pub mod critique;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod runner;
pub mod telemetry;
pub mod validation;
pub mod verifier;

pub use agent::{
    render_prompt, AgentError, AgentOutput, CommandAgent, CommandAgentConfig, ContentAgent,
    ScriptedAgent, ScriptedResponse,
};
pub use analysis::{analyze_audit, RunAnalysis};
pub use artifacts::{read_audit_artifact, read_bundle_artifact, write_run_artifacts};
pub use config::{GuardrailConfig, RunnerConfig};
pub use critique::{ChannelLimit, CritiqueConfig, CritiqueEngine, CritiqueReport};
pub use domain::{
    AgentAudit, AuditLog, AuditMessage, AuditRecord, Channel, ChannelContent, ChannelScorecard,
    ClaimVerification, ContentBundle, CtaTarget, EventBrief, GuardError, IterationVerdict, Result,
    RunnerResult, RunnerState, ToolCall,
};
pub use runner::{feedback_block, GuardrailRunner};
pub use validation::{
    extract_claims, has_unverified_claims, unverified_claims, validate_bundle_schema,
    SchemaViolation,
};
pub use verifier::{find_quoted_span, ClaimVerifier, VerifierConfig};
