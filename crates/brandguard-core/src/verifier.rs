//! Claim Verifier: similarity-based attribution of claims to source chunks.
//!
//! Cost is `claims x chunks` similarity calls plus, per supported claim, a
//! span search of `window sizes x chunk tokens` set intersections. That is
//! fine for a brief's handful of claims against a few retrieved chunks; it
//! does not scale to whole-corpus candidate sets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use brandguard_similarity::SimilarityService;
use brandguard_store::{Chunk, ChunkStore};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ClaimVerification;
use crate::metrics::METRICS;

/// Attribution thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Minimum best-match similarity for a claim to count as supported.
    pub support_threshold: f64,
    pub min_span_words: usize,
    pub max_span_words: usize,
    /// Fraction of the claim's tokens a span must cover.
    pub span_overlap_ratio: f64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            support_threshold: 0.7,
            min_span_words: 3,
            max_span_words: 20,
            span_overlap_ratio: 0.5,
        }
    }
}

pub struct ClaimVerifier {
    store: Arc<dyn ChunkStore>,
    similarity: Arc<dyn SimilarityService>,
    config: VerifierConfig,
}

impl ClaimVerifier {
    pub fn new(store: Arc<dyn ChunkStore>, similarity: Arc<dyn SimilarityService>) -> Self {
        Self {
            store,
            similarity,
            config: VerifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `claims` against the chunks named by `candidate_ids`.
    ///
    /// Returns one entry per claim, in input order. Never fails: unresolvable
    /// ids are dropped, a store outage resolves nothing, and similarity
    /// errors score 0.0.
    pub async fn verify(
        &self,
        claims: &[String],
        candidate_ids: &[String],
    ) -> Vec<ClaimVerification> {
        if claims.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let ids: Vec<String> = candidate_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let resolved: HashMap<String, Chunk> = if ids.is_empty() {
            HashMap::new()
        } else {
            match self.store.lookup(&ids).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(error = %e, candidates = ids.len(), "chunk lookup failed, treating all claims as unsupported");
                    HashMap::new()
                }
            }
        };

        // Keep candidate order so ties resolve to the first-listed chunk.
        let chunks: Vec<(&str, &Chunk)> = ids
            .iter()
            .filter_map(|id| resolved.get(id).map(|c| (id.as_str(), c)))
            .collect();

        let results: Vec<ClaimVerification> = if chunks.is_empty() {
            claims
                .iter()
                .map(|c| ClaimVerification::unsupported(c.as_str()))
                .collect()
        } else {
            join_all(claims.iter().map(|claim| self.verify_one(claim, &chunks))).await
        };

        let unsupported = results.iter().filter(|r| !r.supported).count();
        METRICS.add_claims_verified(results.len() as u64);
        METRICS.add_claims_unsupported(unsupported as u64);
        debug!(
            claims = results.len(),
            unsupported,
            chunks = chunks.len(),
            "claims verified"
        );

        results
    }

    async fn verify_one(&self, claim: &str, chunks: &[(&str, &Chunk)]) -> ClaimVerification {
        let mut best_score = 0.0_f64;
        let mut best: Option<(&str, &Chunk)> = None;

        for &(id, chunk) in chunks {
            let score = self.score(claim, &chunk.text).await;
            if score > best_score {
                best_score = score;
                best = Some((id, chunk));
            }
        }

        let supported = best_score >= self.config.support_threshold;
        let (source_id, quoted_span) = match best {
            Some((id, chunk)) if supported => (
                Some(id.to_string()),
                find_quoted_span(
                    claim,
                    &chunk.text,
                    self.config.min_span_words,
                    self.config.max_span_words,
                    self.config.span_overlap_ratio,
                ),
            ),
            _ => (None, None),
        };

        ClaimVerification {
            claim: claim.to_string(),
            source_id,
            similarity: round3(best_score),
            supported,
            quoted_span,
        }
    }

    async fn score(&self, claim: &str, text: &str) -> f64 {
        match self.similarity.similarity(claim, text).await {
            Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(score) => {
                warn!(score, "non-finite similarity, scoring 0.0");
                0.0
            }
            Err(e) => {
                warn!(error = %e, "similarity service failed, scoring 0.0");
                0.0
            }
        }
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Find the window of `source` sharing the most distinct words with `claim`.
///
/// Windows span `min_words..=min(max_words, source_len)` tokens. Matching is
/// case-insensitive; the returned span keeps the source casing. Returns
/// `None` when either text has fewer than `min_words` tokens or the best
/// overlap covers less than `ratio` of the claim's tokens.
pub fn find_quoted_span(
    claim: &str,
    source: &str,
    min_words: usize,
    max_words: usize,
    ratio: f64,
) -> Option<String> {
    let claim_tokens: Vec<String> = claim.split_whitespace().map(str::to_lowercase).collect();
    let original: Vec<&str> = source.split_whitespace().collect();
    let lowered: Vec<String> = original.iter().map(|w| w.to_lowercase()).collect();

    if min_words == 0 || claim_tokens.len() < min_words || lowered.len() < min_words {
        return None;
    }

    let claim_set: HashSet<&str> = claim_tokens.iter().map(String::as_str).collect();
    let largest = max_words.min(lowered.len());

    let mut best_overlap = 0usize;
    let mut best_span: Option<(usize, usize)> = None;

    for size in min_words..=largest {
        for start in 0..=(lowered.len() - size) {
            let window: HashSet<&str> = lowered[start..start + size]
                .iter()
                .map(String::as_str)
                .collect();
            let overlap = window.intersection(&claim_set).count();
            if overlap > best_overlap {
                best_overlap = overlap;
                best_span = Some((start, size));
            }
        }
    }

    let (start, size) = best_span?;
    if (best_overlap as f64) < claim_tokens.len() as f64 * ratio {
        return None;
    }
    Some(original[start..start + size].join(" "))
}
