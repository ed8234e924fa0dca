//! Generative agent port.
//!
//! The agent is a black box: given a brief it returns a content bundle (or
//! nothing), plus its own audit trail. The runner only depends on the
//! `ContentAgent` trait so tests can script bundles and failures.

mod command;
mod prompt;
mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AgentAudit, ContentBundle, EventBrief};

pub use command::{CommandAgent, CommandAgentConfig};
pub use prompt::render_prompt;
pub use scripted::{ScriptedAgent, ScriptedResponse};

/// Errors raised by an agent invocation. Every variant is a retryable
/// per-iteration fault from the runner's point of view.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent failed: {0}")]
    Failed(String),

    #[error("agent timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("agent call cancelled")]
    Cancelled,

    #[error("agent protocol error: {0}")]
    Protocol(String),

    #[error("agent io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What one agent invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Whether the agent reported completing its workflow.
    pub success: bool,
    #[serde(default)]
    pub bundle: Option<ContentBundle>,
    #[serde(default)]
    pub audit: AgentAudit,
    /// Chunk ids the agent retrieved; candidates for claim verification.
    #[serde(default)]
    pub retrieved_chunk_ids: Vec<String>,
}

impl AgentOutput {
    pub fn completed(bundle: ContentBundle) -> Self {
        let mut audit = AgentAudit::started_now();
        audit.complete();
        Self {
            success: true,
            bundle: Some(bundle),
            audit,
            retrieved_chunk_ids: Vec::new(),
        }
    }

    /// Successful run that wrote no bundle.
    pub fn empty() -> Self {
        let mut audit = AgentAudit::started_now();
        audit.complete();
        Self {
            success: true,
            bundle: None,
            audit,
            retrieved_chunk_ids: Vec::new(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let mut audit = AgentAudit::started_now();
        audit.record_message(reason);
        audit.complete();
        Self {
            success: false,
            bundle: None,
            audit,
            retrieved_chunk_ids: Vec::new(),
        }
    }

    pub fn with_chunk_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retrieved_chunk_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_audit(mut self, audit: AgentAudit) -> Self {
        self.audit = audit;
        self
    }
}

/// A generative content agent.
#[async_trait]
pub trait ContentAgent: Send + Sync {
    /// Draft a bundle for `brief`.
    async fn generate(&self, brief: &EventBrief) -> Result<AgentOutput, AgentError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "agent"
    }
}
