//! Event brief: the request handed to the generative agent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{GuardError, Result};

/// Output channels BrandGuard knows how to draft for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Linkedin,
    Facebook,
    Email,
    Web,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Linkedin,
        Channel::Facebook,
        Channel::Email,
        Channel::Web,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Linkedin => "linkedin",
            Channel::Facebook => "facebook",
            Channel::Email => "email",
            Channel::Web => "web",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Channel::Linkedin),
            "facebook" => Ok(Channel::Facebook),
            "email" => Ok(Channel::Email),
            "web" => Ok(Channel::Web),
            other => Err(GuardError::UnknownChannel(other.to_string())),
        }
    }
}

/// A labelled call-to-action destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaTarget {
    pub label: String,
    pub url: String,
}

impl CtaTarget {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Structured description of the event to promote.
///
/// `prior_feedback` is owned by the runner: each unverified-claims retry
/// appends one block, and blocks are never removed within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBrief {
    pub event_title: String,
    pub event_description: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub key_messages: Vec<String>,
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub relevant_urls: Vec<CtaTarget>,
    #[serde(default)]
    pub prior_feedback: Vec<String>,
}

impl EventBrief {
    pub fn new(
        event_title: impl Into<String>,
        event_description: impl Into<String>,
        channels: Vec<Channel>,
    ) -> Self {
        Self {
            event_title: event_title.into(),
            event_description: event_description.into(),
            event_date: None,
            target_audience: String::new(),
            key_messages: Vec::new(),
            channels,
            relevant_urls: Vec::new(),
            prior_feedback: Vec::new(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.event_date = Some(date.into());
        self
    }

    pub fn with_key_message(mut self, message: impl Into<String>) -> Self {
        self.key_messages.push(message.into());
        self
    }

    pub fn with_url(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.relevant_urls.push(CtaTarget::new(label, url));
        self
    }

    /// Reject briefs the agent cannot act on.
    pub fn validate(&self) -> Result<()> {
        if self.event_title.trim().is_empty() {
            return Err(GuardError::InvalidBrief(
                "event_title cannot be empty".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(GuardError::InvalidBrief(
                "at least one channel is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Append a feedback block. Returns `false` when an identical block is
    /// already present.
    pub fn add_feedback(&mut self, block: impl Into<String>) -> bool {
        let block = block.into();
        if self.prior_feedback.iter().any(|b| *b == block) {
            return false;
        }
        self.prior_feedback.push(block);
        true
    }
}
