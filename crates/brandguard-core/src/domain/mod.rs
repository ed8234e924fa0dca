//! Domain models for BrandGuard.
//!
//! - `EventBrief`: the generation request, mutable across retries via feedback
//! - `ContentBundle`: per-channel drafts, scorecards, and the claims table
//! - `ClaimVerification`: attribution outcome for one claim
//! - `AuditLog`: append-only per-iteration trail
//! - `RunnerResult`: the only externally visible output of a run

pub mod audit;
pub mod brief;
pub mod bundle;
pub mod claim;
pub mod error;
mod lenient;
pub mod result;

pub use audit::{AgentAudit, AuditLog, AuditMessage, AuditRecord, IterationVerdict, ToolCall};
pub use brief::{Channel, CtaTarget, EventBrief};
pub use bundle::{ChannelContent, ChannelScorecard, ContentBundle};
pub use claim::ClaimVerification;
pub use error::{GuardError, Result};
pub use result::{RunnerResult, RunnerState};
