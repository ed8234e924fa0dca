use serde::{Deserialize, Serialize};

use super::lenient;

/// Attribution outcome for one claim.
///
/// `source_id` and `quoted_span` are only ever set on supported claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerification {
    #[serde(default, deserialize_with = "lenient::text")]
    pub claim: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub similarity: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub supported: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub quoted_span: Option<String>,
}

impl ClaimVerification {
    /// An unsupported entry with no attribution.
    pub fn unsupported(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            source_id: None,
            similarity: 0.0,
            supported: false,
            quoted_span: None,
        }
    }
}
