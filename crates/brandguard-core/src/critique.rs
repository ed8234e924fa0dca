//! Critique Engine: deterministic and heuristic scoring of one channel draft.
//!
//! Scoring is a pure function of the draft and the `CritiqueConfig` tables.
//! Hard checks (length, email subject, CTA presence) and soft checks (CTA
//! clarity, brand voice, passive voice) all contribute to `issues` and
//! `suggestions` independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ChannelScorecard;

/// Minimum score on both axes for a channel to pass.
pub const PASS_SCORE: u8 = 7;

const CTA_CLEAR_SCORE: u8 = 8;
const CTA_UNCLEAR_SCORE: u8 = 5;
const BUZZWORD_SCORE: u8 = 4;
const PASSIVE_FLOOR: u8 = 5;

/// Character ceilings for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLimit {
    pub max_chars: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_max: Option<usize>,
}

impl ChannelLimit {
    pub const fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            subject_max: None,
        }
    }
}

/// Vocabulary and limit tables driving the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CritiqueConfig {
    pub channel_limits: BTreeMap<String, ChannelLimit>,
    pub min_cta_chars: usize,
    pub cta_keywords: Vec<String>,
    pub positive_terms: Vec<String>,
    pub negative_terms: Vec<String>,
    pub passive_markers: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for CritiqueConfig {
    fn default() -> Self {
        let mut channel_limits = BTreeMap::new();
        channel_limits.insert("linkedin".to_string(), ChannelLimit::new(3000));
        channel_limits.insert("facebook".to_string(), ChannelLimit::new(500));
        channel_limits.insert(
            "email".to_string(),
            ChannelLimit {
                max_chars: 1500,
                subject_max: Some(60),
            },
        );
        channel_limits.insert("web".to_string(), ChannelLimit::new(300));

        Self {
            channel_limits,
            min_cta_chars: 5,
            cta_keywords: words(&[
                "register", "join", "learn", "discover", "get", "start", "sign up", "download",
                "watch", "explore", "reserve", "claim",
            ]),
            positive_terms: words(&[
                "you", "your", "teams", "together", "discover", "learn", "build", "create",
                "transform", "improve",
            ]),
            negative_terms: words(&[
                "revolutionary",
                "game-changing",
                "synergy",
                "leverage",
                "paradigm",
                "best-in-class",
                "world-class",
                "cutting-edge",
            ]),
            passive_markers: words(&["will be", "has been", "was", "were", "is being"]),
        }
    }
}

impl CritiqueConfig {
    /// Limit for `channel`; unknown channels get the most permissive profile.
    pub fn limit_for(&self, channel: &str) -> ChannelLimit {
        if let Some(limit) = self.channel_limits.get(&channel.to_ascii_lowercase()) {
            return *limit;
        }
        self.channel_limits
            .values()
            .max_by_key(|l| l.max_chars)
            .map(|l| ChannelLimit::new(l.max_chars))
            .unwrap_or(ChannelLimit::new(usize::MAX))
    }
}

/// Full critique of one channel draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueReport {
    pub channel: String,
    pub brand_voice_score: u8,
    pub cta_clarity_score: u8,
    pub length_ok: bool,
    pub char_count: usize,
    pub max_chars: usize,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub feedback: String,
    pub passed: bool,
    /// Number of claims the caller declared alongside the draft.
    pub claims_declared: usize,
}

impl CritiqueReport {
    pub fn scorecard(&self) -> ChannelScorecard {
        ChannelScorecard {
            brand_voice_score: self.brand_voice_score,
            cta_clarity_score: self.cta_clarity_score,
            length_ok: self.length_ok,
            char_count: self.char_count,
            passed: self.passed,
        }
    }
}

/// Stateless scorer over an injected `CritiqueConfig`.
#[derive(Debug, Clone, Default)]
pub struct CritiqueEngine {
    config: CritiqueConfig,
}

impl CritiqueEngine {
    pub fn new(config: CritiqueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CritiqueConfig {
        &self.config
    }

    pub fn critique(
        &self,
        channel: &str,
        headline: Option<&str>,
        body: &str,
        cta: &str,
        claims: &[String],
    ) -> CritiqueReport {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        let limit = self.config.limit_for(channel);
        let headline = headline.unwrap_or("");

        // Hard constraints
        let char_count = body.chars().count() + headline.chars().count() + cta.chars().count();
        let length_ok = char_count <= limit.max_chars;
        if !length_ok {
            issues.push(format!(
                "Content exceeds {} limit: {}/{} chars",
                channel, char_count, limit.max_chars
            ));
            suggestions.push(format!(
                "Reduce content by {} characters",
                char_count - limit.max_chars
            ));
        }

        if let Some(subject_max) = limit.subject_max {
            let subject_len = headline.chars().count();
            if subject_len > subject_max {
                issues.push(format!(
                    "Subject line too long: {}/{} chars",
                    subject_len, subject_max
                ));
                suggestions.push(format!(
                    "Shorten subject line to under {} characters",
                    subject_max
                ));
            }
        }

        if cta.trim().chars().count() < self.config.min_cta_chars {
            issues.push("CTA is missing or too short".to_string());
            suggestions.push("Add a clear call-to-action".to_string());
        }

        // Heuristics
        let cta_lower = cta.to_lowercase();
        let cta_clarity_score = if self
            .config
            .cta_keywords
            .iter()
            .any(|kw| cta_lower.contains(kw.as_str()))
        {
            CTA_CLEAR_SCORE
        } else {
            issues.push("CTA lacks clear action verb".to_string());
            suggestions
                .push("Use action words like 'Register', 'Join', 'Learn', 'Discover'".to_string());
            CTA_UNCLEAR_SCORE
        };

        let text = format!("{} {}", body, headline).to_lowercase();
        let negatives: Vec<&str> = present_terms(&self.config.negative_terms, &text);
        let positive_count = present_terms(&self.config.positive_terms, &text).len();

        let mut brand_voice_score = if negatives.len() > 2 {
            issues.push(format!(
                "Contains {} buzzwords/jargon terms",
                negatives.len()
            ));
            suggestions.push(format!(
                "Remove buzzwords: {}",
                negatives.iter().take(3).copied().collect::<Vec<_>>().join(", ")
            ));
            BUZZWORD_SCORE
        } else if positive_count >= 3 && negatives.is_empty() {
            9
        } else if positive_count >= 2 {
            8
        } else if positive_count >= 1 {
            7
        } else {
            suggestions.push("Add more direct address ('you', 'your') and action words".to_string());
            6
        };

        if present_terms(&self.config.passive_markers, &text).len() > 2 {
            issues.push("Content may contain passive voice".to_string());
            suggestions.push("Convert passive voice to active voice".to_string());
            brand_voice_score = brand_voice_score.saturating_sub(1).max(PASSIVE_FLOOR);
        }

        let passed =
            brand_voice_score >= PASS_SCORE && cta_clarity_score >= PASS_SCORE && length_ok;
        let feedback = feedback_string(passed, &issues, &suggestions);

        CritiqueReport {
            channel: channel.to_string(),
            brand_voice_score,
            cta_clarity_score,
            length_ok,
            char_count,
            max_chars: limit.max_chars,
            issues,
            suggestions,
            feedback,
            passed,
            claims_declared: claims.len(),
        }
    }
}

/// Terms from `vocabulary` occurring in `text`, in table order. Each term counts once.
fn present_terms<'a>(vocabulary: &'a [String], text: &str) -> Vec<&'a str> {
    vocabulary
        .iter()
        .filter(|term| text.contains(term.as_str()))
        .map(String::as_str)
        .collect()
}

fn feedback_string(passed: bool, issues: &[String], suggestions: &[String]) -> String {
    let mut parts = Vec::new();
    if passed {
        parts.push("PASS: Content meets quality standards.".to_string());
        if !suggestions.is_empty() {
            parts.push(format!(
                "MINOR IMPROVEMENTS: {}",
                suggestions.iter().take(2).cloned().collect::<Vec<_>>().join("; ")
            ));
        }
    } else {
        parts.push("FAIL: Content does not meet quality standards.".to_string());
        if !issues.is_empty() {
            parts.push(format!("ISSUES: {}", issues.join("; ")));
        }
        if !suggestions.is_empty() {
            parts.push(format!("FIX: {}", suggestions.join("; ")));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_channel_gets_most_permissive_limit() {
        let config = CritiqueConfig::default();
        assert_eq!(config.limit_for("tiktok").max_chars, 3000);
        assert_eq!(config.limit_for("tiktok").subject_max, None);
        assert_eq!(config.limit_for("Web").max_chars, 300);
    }

    #[test]
    fn passive_penalty_respects_floor() {
        let engine = CritiqueEngine::default();
        // No positive terms (score 6), three passive markers present.
        let report = engine.critique(
            "linkedin",
            None,
            "It was planned. Seats were sold. Lunch will be served.",
            "Register now",
            &[],
        );
        assert_eq!(report.brand_voice_score, 5);
        assert!(report
            .issues
            .iter()
            .any(|i| i == "Content may contain passive voice"));
    }

    #[test]
    fn email_subject_checked_independently() {
        let engine = CritiqueEngine::default();
        let subject = "S".repeat(61);
        let report = engine.critique("email", Some(&subject), "Join your team.", "Register now", &[]);
        assert!(report.length_ok);
        assert!(report
            .issues
            .iter()
            .any(|i| i.starts_with("Subject line too long: 61/60")));
    }

    #[test]
    fn short_cta_is_missing() {
        let engine = CritiqueEngine::default();
        let report = engine.critique("web", None, "You learn.", " Go ", &[]);
        assert!(report.issues.iter().any(|i| i == "CTA is missing or too short"));
        assert_eq!(report.cta_clarity_score, 5);
    }

    #[test]
    fn custom_vocabulary_is_honoured() {
        let mut config = CritiqueConfig::default();
        config.cta_keywords = vec!["apply".to_string()];
        let engine = CritiqueEngine::new(config);
        let report = engine.critique("web", None, "You build.", "Apply today", &[]);
        assert_eq!(report.cta_clarity_score, 8);
        let report = engine.critique("web", None, "You build.", "Register today", &[]);
        assert_eq!(report.cta_clarity_score, 5);
    }

    #[test]
    fn passing_feedback_lists_at_most_two_improvements() {
        let s = feedback_string(
            true,
            &[],
            &["a".to_string(), "b".to_string(), "c".to_string()],
        );
        assert_eq!(
            s,
            "PASS: Content meets quality standards. MINOR IMPROVEMENTS: a; b"
        );
    }
}
