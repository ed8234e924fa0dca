//! Audit trail types.
//!
//! The agent reports its own tool calls and messages as an `AgentAudit`. The
//! runner appends its guardrail steps to the same trail, wraps it in an
//! `AuditRecord` per iteration, and combines all records into an `AuditLog`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// One tool or operation invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tool: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub input_summary: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_summary: Option<String>,
    /// 1-based iteration, set when the call is folded into an `AuditLog`.
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub iteration: Option<u32>,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, input_summary: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            tool: tool.into(),
            input_summary: input_summary.into(),
            response_summary: None,
            iteration: None,
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response_summary = Some(response.into());
        self
    }
}

/// A free-form message emitted by the agent or the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMessage {
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
}

impl AuditMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            content: content.into(),
        }
    }
}

/// Trail of a single agent invocation.
///
/// Agents write timestamps with or without a UTC offset; offset-less values
/// are taken as UTC. Malformed entries are dropped one by one so the rest of
/// the trail survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAudit {
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub messages: Vec<AuditMessage>,
}

impl AgentAudit {
    pub fn started_now() -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            tool_calls: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn record_tool(&mut self, call: ToolCall) {
        self.tool_calls.push(call);
    }

    pub fn record_message(&mut self, content: impl Into<String>) {
        self.messages.push(AuditMessage::new(content));
    }

    pub fn complete(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }
}

impl Default for AgentAudit {
    fn default() -> Self {
        Self::started_now()
    }
}

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationVerdict {
    AgentFault,
    NoOutput,
    SchemaInvalid,
    Unverified,
    Accepted,
    Cancelled,
}

/// Audit of one generate-validate cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// 1-based.
    pub iteration: u32,
    pub audit: AgentAudit,
    pub success: bool,
    pub verdict: IterationVerdict,
}

/// Combined, append-only audit of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    pub total_iterations: u32,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub iterations: Vec<AuditRecord>,
    #[serde(default)]
    pub all_tool_calls: Vec<ToolCall>,
}

impl AuditLog {
    /// Fold iteration records into one log, stamping each tool call with its
    /// iteration.
    pub fn combine(
        run_id: impl Into<String>,
        started_at: DateTime<Utc>,
        records: Vec<AuditRecord>,
        success: bool,
        flags: Vec<String>,
    ) -> Self {
        let all_tool_calls = records
            .iter()
            .flat_map(|record| {
                record.audit.tool_calls.iter().map(move |call| ToolCall {
                    iteration: Some(record.iteration),
                    ..call.clone()
                })
            })
            .collect();

        Self {
            run_id: run_id.into(),
            started_at,
            completed_at: Utc::now(),
            success,
            total_iterations: records.len() as u32,
            flags,
            iterations: records,
            all_tool_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iteration: u32, tools: &[&str]) -> AuditRecord {
        let mut audit = AgentAudit::started_now();
        for tool in tools {
            audit.record_tool(ToolCall::new(*tool, "q"));
        }
        audit.complete();
        AuditRecord {
            iteration,
            audit,
            success: true,
            verdict: IterationVerdict::Unverified,
        }
    }

    #[test]
    fn combine_stamps_iterations_in_order() {
        let log = AuditLog::combine(
            "run-1",
            Utc::now(),
            vec![
                record(1, &["retrieve_context", "verify_claims"]),
                record(2, &["retrieve_context"]),
            ],
            false,
            vec!["max_iterations_reached".to_string()],
        );

        assert_eq!(log.total_iterations, 2);
        let stamped: Vec<_> = log
            .all_tool_calls
            .iter()
            .map(|c| (c.tool.as_str(), c.iteration))
            .collect();
        assert_eq!(
            stamped,
            vec![
                ("retrieve_context", Some(1)),
                ("verify_claims", Some(1)),
                ("retrieve_context", Some(2)),
            ]
        );
        // Per-iteration trails stay unstamped.
        assert!(log.iterations[0].audit.tool_calls[0].iteration.is_none());
    }

    #[test]
    fn complete_is_sticky() {
        let mut audit = AgentAudit::started_now();
        audit.complete();
        let first = audit.completed_at;
        audit.complete();
        assert_eq!(audit.completed_at, first);
    }

    #[test]
    fn agent_audit_accepts_offsetless_timestamps() {
        let json = r#"{
            "started_at": "2026-01-01T00:00:00.000001",
            "tool_calls": [
                {"timestamp": "2026-01-01T00:00:01.123456", "tool": "mcp__brandguard__retrieve_context", "input_summary": {"query": "summit"}},
                "not a call",
                {"timestamp": "2026-01-01T00:00:02", "tool": "mcp__brandguard__verify_claims"}
            ],
            "messages": [{"timestamp": "2026-01-01T00:00:03", "content": "done"}]
        }"#;
        let audit: AgentAudit = serde_json::from_str(json).unwrap();

        let tools: Vec<_> = audit.tool_calls.iter().map(|c| c.tool.as_str()).collect();
        assert_eq!(
            tools,
            vec![
                "mcp__brandguard__retrieve_context",
                "mcp__brandguard__verify_claims"
            ]
        );
        assert_eq!(
            audit.tool_calls[0].timestamp.to_rfc3339(),
            "2026-01-01T00:00:01.123456+00:00"
        );
        assert_eq!(audit.tool_calls[0].input_summary, r#"{"query":"summit"}"#);
        assert_eq!(audit.messages[0].content, "done");
    }

    #[test]
    fn audit_log_round_trips_through_json() {
        let log = AuditLog::combine(
            "run-1",
            Utc::now(),
            vec![record(1, &["retrieve_context"])],
            true,
            vec![],
        );
        let json = serde_json::to_string(&log).unwrap();
        let back: AuditLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
