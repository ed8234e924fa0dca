use serde::{Deserialize, Serialize};

use super::audit::AuditLog;
use super::bundle::ContentBundle;

/// Runner state machine: `Drafting -> Validating -> {Accepted | Retrying | Exhausted}`.
///
/// `Cancelled` is entered from any state when the caller aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerState {
    Drafting,
    Validating,
    Accepted,
    Retrying,
    Exhausted,
    Cancelled,
}

impl RunnerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerState::Drafting => "drafting",
            RunnerState::Validating => "validating",
            RunnerState::Accepted => "accepted",
            RunnerState::Retrying => "retrying",
            RunnerState::Exhausted => "exhausted",
            RunnerState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunnerState::Accepted | RunnerState::Exhausted | RunnerState::Cancelled
        )
    }
}

/// The only externally visible output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerResult {
    pub run_id: String,
    pub success: bool,
    pub result: Option<ContentBundle>,
    pub iterations: u32,
    pub flags: Vec<String>,
    pub audit_log: AuditLog,
    /// Set when the run itself completed but artifact persistence failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunnerResult {
    pub fn has_flag(&self, prefix: &str) -> bool {
        self.flags.iter().any(|f| f.starts_with(prefix))
    }
}
