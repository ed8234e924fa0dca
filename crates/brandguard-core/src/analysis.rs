//! Post-run analysis of agent behaviour from a persisted audit log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::AuditLog;

/// Prefixes of calls recorded by the host rather than the agent.
const HOST_PREFIXES: &[&str] = &["guardrail.", "agent."];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAnalysis {
    pub run_id: String,
    pub success: bool,
    pub iterations: u32,
    pub flags: Vec<String>,
    pub tool_sequence: Vec<String>,
    pub tool_counts: BTreeMap<String, usize>,
    pub observations: Vec<String>,
}

/// `mcp__brandguard__verify_claims` -> `verify_claims`.
fn short_tool_name(tool: &str) -> &str {
    tool.rsplit("__").next().unwrap_or(tool)
}

/// Summarise which tools the agent used, in what order, and how often.
pub fn analyze_audit(audit: &AuditLog) -> RunAnalysis {
    let tool_sequence: Vec<String> = audit
        .iterations
        .iter()
        .flat_map(|record| record.audit.tool_calls.iter())
        .map(|call| call.tool.as_str())
        .filter(|tool| !tool.is_empty() && *tool != "unknown")
        .filter(|tool| !HOST_PREFIXES.iter().any(|p| tool.starts_with(p)))
        .map(|tool| short_tool_name(tool).to_string())
        .collect();

    let mut tool_counts: BTreeMap<String, usize> = BTreeMap::new();
    for tool in &tool_sequence {
        *tool_counts.entry(tool.clone()).or_default() += 1;
    }

    let mut observations = Vec::new();
    if let Some(first) = tool_sequence.first() {
        if first == "retrieve_context" {
            observations.push("Agent correctly retrieved context first".to_string());
        } else {
            observations.push(format!(
                "Agent started with {} instead of retrieve_context",
                first
            ));
        }
    }

    match tool_counts.get("critique_draft") {
        Some(n) => observations.push(format!("Agent critiqued drafts {} times", n)),
        None => observations.push("Agent never critiqued its drafts".to_string()),
    }
    match tool_counts.get("verify_claims") {
        Some(n) => observations.push(format!("Agent verified claims {} times", n)),
        None => observations.push("Agent never verified claims".to_string()),
    }
    if tool_counts.contains_key("generate_images") {
        observations.push("Agent generated images".to_string());
    } else {
        observations.push("Agent did not generate images".to_string());
    }

    RunAnalysis {
        run_id: audit.run_id.clone(),
        success: audit.success,
        iterations: audit.total_iterations,
        flags: audit.flags.clone(),
        tool_sequence,
        tool_counts,
        observations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names() {
        assert_eq!(short_tool_name("mcp__brandguard__verify_claims"), "verify_claims");
        assert_eq!(short_tool_name("retrieve_context"), "retrieve_context");
    }
}
