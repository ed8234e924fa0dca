//! BrandGuard Similarity: bounded text similarity for claim attribution
//!
//! Every service returns a score in `[0, 1]`. Callers treat errors as a
//! score of `0.0`, so a flaky backend degrades attribution instead of
//! aborting a run.

mod cosine;
mod embedding;
mod error;
mod lexical;

use async_trait::async_trait;

pub use cosine::cosine_similarity;
pub use embedding::{EmbeddingConfig, EmbeddingSimilarity};
pub use error::{Result, SimilarityError};
pub use lexical::LexicalSimilarity;

/// Similarity between two text spans.
///
/// Implementations must be deterministic for identical inputs so verification
/// stays reproducible.
#[async_trait]
pub trait SimilarityService: Send + Sync {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64>;
}

/// Scripted similarity for tests: the first rule whose needles appear in
/// both texts decides the score, otherwise `default`.
#[derive(Debug, Clone, Default)]
pub struct FixedSimilarity {
    rules: Vec<(String, String, f64)>,
    default: f64,
}

impl FixedSimilarity {
    pub fn new(default: f64) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Score `score` whenever `a` contains `needle_a` and `b` contains `needle_b`.
    pub fn with_rule(mut self, needle_a: &str, needle_b: &str, score: f64) -> Self {
        self.rules
            .push((needle_a.to_string(), needle_b.to_string(), score));
        self
    }
}

#[async_trait]
impl SimilarityService for FixedSimilarity {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        let score = self
            .rules
            .iter()
            .find(|(na, nb, _)| text_a.contains(na.as_str()) && text_b.contains(nb.as_str()))
            .map(|(_, _, s)| *s)
            .unwrap_or(self.default);
        Ok(score)
    }
}
