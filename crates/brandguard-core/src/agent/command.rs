//! Agent backed by an external program.
//!
//! Protocol: the program receives `{"brief": .., "prompt": ..}` as JSON on
//! stdin and prints either a bare `ContentBundle` or an envelope
//! `{"bundle"?, "audit"?, "retrieved_chunk_ids"?, "success"?}` on stdout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{render_prompt, AgentError, AgentOutput, ContentAgent};
use crate::domain::{AgentAudit, ContentBundle, EventBrief, ToolCall};

const ENVELOPE_KEYS: &[&str] = &["bundle", "audit", "retrieved_chunk_ids", "success"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAgentConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl CommandAgentConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    brief: &'a EventBrief,
    prompt: String,
}

pub struct CommandAgent {
    config: CommandAgentConfig,
}

impl CommandAgent {
    pub fn new(config: CommandAgentConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContentAgent for CommandAgent {
    async fn generate(&self, brief: &EventBrief) -> Result<AgentOutput, AgentError> {
        let request = AgentRequest {
            brief,
            prompt: render_prompt(brief),
        };
        let payload =
            serde_json::to_vec(&request).map_err(|e| AgentError::Protocol(e.to_string()))?;

        let mut audit = AgentAudit::started_now();
        audit.record_tool(ToolCall::new(
            "agent.spawn",
            format!("{} {}", self.config.program, self.config.args.join(" ")),
        ));

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future (timeout, cancel) must not leave the agent running.
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // A program that never reads its request may exit before we finish writing.
            let written = match stdin.write_all(&payload).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            match written {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!(program = %self.config.program, "agent closed stdin early");
                }
                Err(e) => return Err(e.into()),
            }
        }
        let output = child.wait_with_output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        debug!(
            program = %self.config.program,
            exit_code = output.status.code().unwrap_or(-1),
            stdout_bytes = stdout.len(),
            "agent process exited"
        );

        if !output.status.success() {
            audit.record_message(format!(
                "agent exited with {}: {}",
                output.status,
                stderr.trim()
            ));
            audit.complete();
            return Ok(AgentOutput {
                success: false,
                bundle: None,
                audit,
                retrieved_chunk_ids: Vec::new(),
            });
        }

        if !stderr.trim().is_empty() {
            audit.record_message(stderr.trim().to_string());
        }
        let mut parsed = parse_stdout(&stdout, audit)?;
        parsed.audit.complete();
        Ok(parsed)
    }

    fn name(&self) -> &str {
        &self.config.program
    }
}

fn is_envelope(obj: &serde_json::Map<String, serde_json::Value>) -> bool {
    !obj.contains_key("content") && ENVELOPE_KEYS.iter().any(|k| obj.contains_key(*k))
}

/// Parse agent stdout. Empty output means "no bundle".
fn parse_stdout(stdout: &str, mut audit: AgentAudit) -> Result<AgentOutput, AgentError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(AgentOutput {
            success: true,
            bundle: None,
            audit,
            retrieved_chunk_ids: Vec::new(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| AgentError::Protocol(format!("stdout is not JSON: {}", e)))?;

    let mut obj = match value {
        serde_json::Value::Object(obj) if is_envelope(&obj) => obj,
        other => {
            let bundle: ContentBundle = serde_json::from_value(other)
                .map_err(|e| AgentError::Protocol(format!("invalid bundle: {}", e)))?;
            return Ok(AgentOutput {
                success: true,
                bundle: Some(bundle),
                audit,
                retrieved_chunk_ids: Vec::new(),
            });
        }
    };

    let bundle = match obj.remove("bundle") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<ContentBundle>(raw)
                .map_err(|e| AgentError::Protocol(format!("invalid bundle: {}", e)))?,
        ),
    };

    if let Some(raw) = obj.remove("audit") {
        match serde_json::from_value::<AgentAudit>(raw) {
            Ok(reported) => {
                audit.tool_calls.extend(reported.tool_calls);
                audit.messages.extend(reported.messages);
            }
            Err(e) => warn!(error = %e, "ignoring malformed agent audit"),
        }
    }

    let retrieved_chunk_ids = obj
        .remove("retrieved_chunk_ids")
        .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
        .unwrap_or_default();
    let success = obj
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    Ok(AgentOutput {
        success,
        bundle,
        audit,
        retrieved_chunk_ids,
    })
}
