//! Deterministic agent that replays a script, one response per call.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{AgentError, AgentOutput, ContentAgent};
use crate::domain::EventBrief;

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Output(AgentOutput),
    Fail(String),
    /// Never returns; exercises timeouts and cancellation.
    Hang,
}

/// Replays `ScriptedResponse`s in order, repeating the last one once the
/// script runs out. Records every brief it was called with.
pub struct ScriptedAgent {
    script: Vec<ScriptedResponse>,
    calls: Mutex<Vec<EventBrief>>,
}

impl ScriptedAgent {
    pub fn new(script: Vec<ScriptedResponse>) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns `output`.
    pub fn always(output: AgentOutput) -> Self {
        Self::new(vec![ScriptedResponse::Output(output)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Briefs received so far, in call order.
    pub fn briefs(&self) -> Vec<EventBrief> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentAgent for ScriptedAgent {
    async fn generate(&self, brief: &EventBrief) -> Result<AgentOutput, AgentError> {
        let step = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(brief.clone());
            let index = (calls.len() - 1).min(self.script.len().saturating_sub(1));
            self.script.get(index).cloned()
        };

        match step {
            Some(ScriptedResponse::Output(output)) => Ok(output),
            Some(ScriptedResponse::Fail(reason)) => Err(AgentError::Failed(reason)),
            Some(ScriptedResponse::Hang) => std::future::pending().await,
            None => Err(AgentError::Failed("script is empty".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
