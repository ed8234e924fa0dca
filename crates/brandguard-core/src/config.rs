//! Guardrail configuration.
//!
//! Loaded from TOML with `[runner]`, `[verifier]` and `[critique]` sections.
//! Every field has a default, so an empty file is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::critique::CritiqueConfig;
use crate::domain::{GuardError, Result};
use crate::verifier::VerifierConfig;

/// Retry-loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub max_iterations: u32,
    pub agent_timeout_ms: u64,
    /// Unverified claims listed per feedback block.
    pub max_feedback_claims: usize,
    pub artifacts_dir: Option<PathBuf>,
    /// Where the agent writes its bundle when it does not return one directly.
    pub fallback_output: Option<PathBuf>,
    /// Append heuristically extracted claims to the table before verifying.
    pub extract_undeclared_claims: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            agent_timeout_ms: 600_000,
            max_feedback_claims: 5,
            artifacts_dir: None,
            fallback_output: None,
            extract_undeclared_claims: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    pub runner: RunnerConfig,
    pub verifier: VerifierConfig,
    pub critique: CritiqueConfig,
}

impl GuardrailConfig {
    /// Parse a TOML config file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GuardrailConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BRANDGUARD_*` overrides on top of the current values.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_var("BRANDGUARD_MAX_ITERATIONS") {
            self.runner.max_iterations = parse_env("BRANDGUARD_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = env_var("BRANDGUARD_AGENT_TIMEOUT_MS") {
            self.runner.agent_timeout_ms = parse_env("BRANDGUARD_AGENT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = env_var("BRANDGUARD_SUPPORT_THRESHOLD") {
            self.verifier.support_threshold = parse_env("BRANDGUARD_SUPPORT_THRESHOLD", &v)?;
        }
        if let Some(v) = env_var("BRANDGUARD_ARTIFACTS_DIR") {
            self.runner.artifacts_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.runner.max_iterations == 0 {
            return Err(GuardError::InvalidConfig(
                "runner.max_iterations must be at least 1".to_string(),
            ));
        }
        let threshold = self.verifier.support_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GuardError::InvalidConfig(format!(
                "verifier.support_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.verifier.min_span_words > self.verifier.max_span_words {
            return Err(GuardError::InvalidConfig(format!(
                "verifier.min_span_words ({}) exceeds max_span_words ({})",
                self.verifier.min_span_words, self.verifier.max_span_words
            )));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GuardError::InvalidConfig(format!("{} has invalid value {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = GuardrailConfig::from_toml_str("").unwrap();
        assert_eq!(config, GuardrailConfig::default());
        assert_eq!(config.runner.max_iterations, 2);
        assert_eq!(config.verifier.support_threshold, 0.7);
        assert_eq!(config.critique.channel_limits["web"].max_chars, 300);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = GuardrailConfig::from_toml_str(
            r#"
            [runner]
            max_iterations = 3
            artifacts_dir = "out/runs"

            [critique.channel_limits.sms]
            max_chars = 160
            "#,
        )
        .unwrap();
        assert_eq!(config.runner.max_iterations, 3);
        assert_eq!(config.runner.agent_timeout_ms, 600_000);
        assert_eq!(config.runner.artifacts_dir, Some(PathBuf::from("out/runs")));
        assert_eq!(config.critique.channel_limits["sms"].max_chars, 160);
        assert!(!config.critique.channel_limits.contains_key("web"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(GuardrailConfig::from_toml_str("[runner]\nmax_iterations = 0").is_err());
        assert!(GuardrailConfig::from_toml_str("[verifier]\nsupport_threshold = 1.5").is_err());
        assert!(GuardrailConfig::from_toml_str(
            "[verifier]\nmin_span_words = 10\nmax_span_words = 4"
        )
        .is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = GuardrailConfig::from_toml_str("[runner\n").unwrap_err();
        assert!(matches!(err, GuardError::ConfigParse(_)));
    }

    #[test]
    fn parse_env_reports_key() {
        let err = parse_env::<u32>("BRANDGUARD_MAX_ITERATIONS", "many").unwrap_err();
        assert!(err.to_string().contains("BRANDGUARD_MAX_ITERATIONS"));
    }
}
