//! Content bundle returned by the generative agent.
//!
//! Every field the agent may omit is optional, and fields with the wrong JSON
//! shape decode to their default, so a structurally broken bundle still
//! parses and reaches schema validation instead of failing deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::claim::ClaimVerification;
use super::lenient;

/// Draft copy for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelContent {
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub headline: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub subject_line: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub cta: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::hashtags",
        skip_serializing_if = "Option::is_none"
    )]
    pub hashtags: Option<Vec<String>>,
}

impl ChannelContent {
    pub fn new(body: impl Into<String>, cta: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            cta: Some(cta.into()),
            ..Self::default()
        }
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }

    pub fn with_subject_line(mut self, subject: impl Into<String>) -> Self {
        self.subject_line = Some(subject.into());
        self
    }

    /// Headline used for scoring: the email subject when present, else the headline.
    pub fn title(&self) -> Option<&str> {
        self.subject_line.as_deref().or(self.headline.as_deref())
    }
}

/// Per-channel quality scores.
///
/// Agents report these loosely (fractional scores, strings); the runner
/// recomputes them anyway, so odd values decode to zero rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelScorecard {
    #[serde(deserialize_with = "lenient::score")]
    pub brand_voice_score: u8,
    #[serde(deserialize_with = "lenient::score")]
    pub cta_clarity_score: u8,
    #[serde(deserialize_with = "lenient::or_default")]
    pub length_ok: bool,
    #[serde(deserialize_with = "lenient::count")]
    pub char_count: usize,
    #[serde(deserialize_with = "lenient::or_default")]
    pub passed: bool,
}

/// Complete per-channel output of one generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    #[serde(default, deserialize_with = "lenient::text")]
    pub event_title: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::sections",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<BTreeMap<String, ChannelContent>>,
    #[serde(
        default,
        deserialize_with = "lenient::sections",
        skip_serializing_if = "Option::is_none"
    )]
    pub scorecard: Option<BTreeMap<String, ChannelScorecard>>,
    #[serde(
        default,
        deserialize_with = "lenient::claims_table",
        skip_serializing_if = "Option::is_none"
    )]
    pub claims_table: Option<Vec<ClaimVerification>>,
    #[serde(default, deserialize_with = "lenient::images")]
    pub images: BTreeMap<String, Option<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub iterations: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub flags: Vec<String>,
}

impl ContentBundle {
    pub fn new(event_title: impl Into<String>) -> Self {
        Self {
            event_title: event_title.into(),
            content: Some(BTreeMap::new()),
            scorecard: Some(BTreeMap::new()),
            claims_table: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>, content: ChannelContent) -> Self {
        let channel = channel.into();
        self.content
            .get_or_insert_with(BTreeMap::new)
            .insert(channel.clone(), content);
        self.scorecard
            .get_or_insert_with(BTreeMap::new)
            .entry(channel)
            .or_default();
        self
    }

    pub fn with_claim(mut self, claim: ClaimVerification) -> Self {
        self.claims_table.get_or_insert_with(Vec::new).push(claim);
        self
    }

    /// Claim texts in table order.
    pub fn claim_texts(&self) -> Vec<String> {
        self.claims_table
            .iter()
            .flatten()
            .map(|c| c.claim.clone())
            .collect()
    }

    /// Number of claims currently marked unsupported.
    pub fn unsupported_count(&self) -> usize {
        self.claims_table
            .iter()
            .flatten()
            .filter(|c| !c.supported)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_bundle_parses() {
        let json = r#"{"event_title": "Summit", "content": {}}"#;
        let bundle: ContentBundle = serde_json::from_str(json).unwrap();
        assert!(bundle.content.unwrap().is_empty());
        assert!(bundle.scorecard.is_none());
        assert!(bundle.claims_table.is_none());
    }

    #[test]
    fn loosely_typed_agent_fields_still_parse() {
        let json = r##"{
            "event_title": "Summit",
            "content": {
                "web": {"body": "Body", "cta": "Register now", "hashtags": "#ai #summit"},
                "email": {"body": 42, "cta": "Join us"}
            },
            "scorecard": {
                "web": {"brand_voice_score": 8.5, "cta_clarity_score": "high", "length_ok": "yes"},
                "email": "n/a"
            },
            "claims_table": ["Trusted by 18,000 customers", {"claim": "SOC 2", "similarity": "0.9"}],
            "images": {"web": "hero.png", "email": false}
        }"##;
        let bundle: ContentBundle = serde_json::from_str(json).unwrap();

        let content = bundle.content.as_ref().unwrap();
        assert_eq!(
            content["web"].hashtags.as_deref(),
            Some(&["#ai".to_string(), "#summit".to_string()][..])
        );
        assert_eq!(content["email"].body, None);

        let scorecard = bundle.scorecard.as_ref().unwrap();
        assert_eq!(scorecard["web"].brand_voice_score, 9);
        assert_eq!(scorecard["web"].cta_clarity_score, 0);
        assert!(!scorecard["web"].length_ok);
        assert_eq!(scorecard["email"], ChannelScorecard::default());

        assert_eq!(bundle.claim_texts(), vec!["Trusted by 18,000 customers", "SOC 2"]);
        assert_eq!(bundle.claims_table.as_ref().unwrap()[1].similarity, 0.0);
        assert_eq!(bundle.images["web"].as_deref(), Some("hero.png"));
        assert_eq!(bundle.images["email"], None);
    }

    #[test]
    fn non_object_sections_read_as_missing() {
        let json = r#"{"content": "oops", "scorecard": [], "claims_table": {}}"#;
        let bundle: ContentBundle = serde_json::from_str(json).unwrap();
        assert!(bundle.content.is_none());
        assert!(bundle.scorecard.is_none());
        assert!(bundle.claims_table.is_none());
    }

    #[test]
    fn builder_keeps_content_and_scorecard_aligned() {
        let bundle = ContentBundle::new("Summit")
            .with_channel("web", ChannelContent::new("Body", "Register now"))
            .with_channel("email", ChannelContent::new("Body", "Join us"));

        let content = bundle.content.as_ref().unwrap();
        let scorecard = bundle.scorecard.as_ref().unwrap();
        assert_eq!(
            content.keys().collect::<Vec<_>>(),
            scorecard.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn unsupported_count_ignores_supported() {
        let mut supported = ClaimVerification::unsupported("a");
        supported.supported = true;
        let bundle = ContentBundle::new("Summit")
            .with_claim(supported)
            .with_claim(ClaimVerification::unsupported("b"));
        assert_eq!(bundle.unsupported_count(), 1);
        assert_eq!(bundle.claim_texts(), vec!["a", "b"]);
    }

    #[test]
    fn title_prefers_subject_line() {
        let c = ChannelContent::new("b", "c")
            .with_headline("Headline")
            .with_subject_line("Subject");
        assert_eq!(c.title(), Some("Subject"));
    }
}
