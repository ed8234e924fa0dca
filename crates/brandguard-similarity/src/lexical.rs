//! Term-frequency cosine similarity.
//!
//! Needs no model and no network; used when no embedding endpoint is
//! configured and as the reference implementation in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{Result, SimilarityService};

/// Deterministic bag-of-words cosine similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous scoring; the async trait method delegates here.
    pub fn score(&self, text_a: &str, text_b: &str) -> f64 {
        let a = term_frequencies(text_a);
        let b = term_frequencies(text_b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let dot: f64 = a
            .iter()
            .filter_map(|(term, ca)| b.get(term).map(|cb| f64::from(*ca) * f64::from(*cb)))
            .sum();
        let norm = |m: &BTreeMap<String, u32>| {
            m.values()
                .map(|c| f64::from(*c) * f64::from(*c))
                .sum::<f64>()
                .sqrt()
        };
        let denom = norm(&a) * norm(&b);
        if denom < f64::EPSILON {
            return 0.0;
        }
        (dot / denom).clamp(0.0, 1.0)
    }
}

fn term_frequencies(text: &str) -> BTreeMap<String, u32> {
    let mut tf = BTreeMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *tf.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    tf
}

#[async_trait]
impl SimilarityService for LexicalSimilarity {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        Ok(self.score(text_a, text_b))
    }
}
