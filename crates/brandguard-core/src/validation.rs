//! Structural and claim-support validation of content bundles.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ChannelContent, ContentBundle};

const CLAIM_INDICATORS: &[&str] = &[
    "%",
    "customers",
    "users",
    "teams",
    "companies",
    "reduction",
    "increase",
    "faster",
    "secure",
    "integrates",
    "supports",
    "certified",
    "compliant",
];

const OPINION_STARTERS: &[&str] = &["we believe", "we're excited", "join us", "discover", "learn"];

/// Why a bundle failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    MissingField(&'static str),
    EmptyContent,
    ChannelMissingFields {
        channel: String,
        missing: Vec<&'static str>,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::MissingField(field) => write!(f, "missing field: {}", field),
            SchemaViolation::EmptyContent => write!(f, "content is empty"),
            SchemaViolation::ChannelMissingFields { channel, missing } => {
                write!(f, "channel {} missing {}", channel, missing.join(", "))
            }
        }
    }
}

fn channel_missing(content: &ChannelContent) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if content.body.is_none() {
        missing.push("body");
    }
    if content.cta.is_none() {
        missing.push("cta");
    }
    missing
}

/// Check that `content`, `scorecard` and `claims_table` are present, that
/// `content` is non-empty, and that every channel has a body and a CTA.
pub fn validate_bundle_schema(bundle: &ContentBundle) -> Result<(), SchemaViolation> {
    let content = bundle
        .content
        .as_ref()
        .ok_or(SchemaViolation::MissingField("content"))?;
    if bundle.scorecard.is_none() {
        return Err(SchemaViolation::MissingField("scorecard"));
    }
    if bundle.claims_table.is_none() {
        return Err(SchemaViolation::MissingField("claims_table"));
    }
    if content.is_empty() {
        return Err(SchemaViolation::EmptyContent);
    }

    for (channel, channel_content) in content {
        let missing = channel_missing(channel_content);
        if !missing.is_empty() {
            return Err(SchemaViolation::ChannelMissingFields {
                channel: channel.clone(),
                missing,
            });
        }
    }
    Ok(())
}

/// Claim texts marked `supported = false`, in table order.
pub fn unverified_claims(bundle: &ContentBundle) -> Vec<String> {
    bundle
        .claims_table
        .iter()
        .flatten()
        .filter(|c| !c.supported)
        .map(|c| c.claim.clone())
        .collect()
}

pub fn has_unverified_claims(bundle: &ContentBundle) -> bool {
    bundle.claims_table.iter().flatten().any(|c| !c.supported)
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^.!\n]+[.!]?").expect("sentence pattern is valid"))
}

/// Heuristically pick factual-sounding sentences out of every channel body.
///
/// A sentence qualifies when it mentions a claim indicator (a percentage,
/// customers, certification, ...) and does not open as an opinion or an
/// invitation. Duplicates across channels are returned once.
pub fn extract_claims(bundle: &ContentBundle) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut claims = Vec::new();

    for channel_content in bundle.content.iter().flat_map(|c| c.values()) {
        let Some(body) = channel_content.body.as_deref() else {
            continue;
        };
        for m in sentence_pattern().find_iter(body) {
            let sentence = m.as_str().trim();
            if sentence.is_empty() {
                continue;
            }
            let lower = sentence.to_lowercase();
            if !CLAIM_INDICATORS.iter().any(|i| lower.contains(i)) {
                continue;
            }
            if OPINION_STARTERS.iter().any(|o| lower.starts_with(o)) {
                continue;
            }
            if seen.insert(sentence.to_string()) {
                claims.push(sentence.to_string());
            }
        }
    }
    claims
}
