use std::sync::Arc;

use async_trait::async_trait;
use brandguard_core::{ClaimVerifier, VerifierConfig};
use brandguard_similarity::{FixedSimilarity, LexicalSimilarity, SimilarityError, SimilarityService};
use brandguard_store::{Chunk, FailingChunkStore, MemoryChunkStore};

const CUSTOMERS: &str =
    "Acme Cloud is trusted by over 18,000 customers worldwide and integrates with Slack.";
const SECURITY: &str = "The platform is SOC 2 certified and encrypts all data at rest.";

fn corpus() -> (Arc<MemoryChunkStore>, Vec<String>) {
    let chunks = vec![
        Chunk::with_id("chunk_customers", CUSTOMERS, "product_facts.md"),
        Chunk::with_id("chunk_security", SECURITY, "security.md"),
    ];
    let ids = chunks.iter().map(|c| c.id.as_str().to_string()).collect();
    (Arc::new(MemoryChunkStore::from_chunks(chunks)), ids)
}

fn claims(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn unresolvable_candidates_mark_every_claim_unsupported() {
    let (store, _) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(FixedSimilarity::new(1.0)));

    let results = verifier
        .verify(
            &claims(&["18,000 customers", "SOC 2 certified"]),
            &claims(&["chunk_missing", "chunk_gone"]),
        )
        .await;

    assert_eq!(results.len(), 2);
    for r in &results {
        assert!(!r.supported);
        assert_eq!(r.source_id, None);
        assert_eq!(r.similarity, 0.0);
        assert_eq!(r.quoted_span, None);
    }
}

#[tokio::test]
async fn output_preserves_claim_order() {
    let (store, ids) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(LexicalSimilarity));
    let input = claims(&[
        "The platform is SOC 2 certified",
        "Unrelated statement about weather",
        "trusted by over 18,000 customers",
    ]);

    let results = verifier.verify(&input, &ids).await;

    let echoed: Vec<_> = results.iter().map(|r| r.claim.clone()).collect();
    assert_eq!(echoed, input);
}

#[tokio::test]
async fn supported_claim_gets_source_and_span() {
    let (store, ids) = corpus();
    let similarity = FixedSimilarity::new(0.1).with_rule("18,000", "18,000", 0.92);
    let verifier = ClaimVerifier::new(store, Arc::new(similarity));

    let results = verifier
        .verify(&claims(&["trusted by over 18,000 customers"]), &ids)
        .await;

    let r = &results[0];
    assert!(r.supported);
    assert_eq!(r.similarity, 0.92);
    assert_eq!(r.source_id.as_deref(), Some("chunk_customers"));
    assert_eq!(
        r.quoted_span.as_deref(),
        Some("trusted by over 18,000 customers")
    );
}

#[tokio::test]
async fn supported_claim_without_overlap_has_no_span() {
    let (store, ids) = corpus();
    let similarity = FixedSimilarity::new(0.0).with_rule("audited", "SOC 2", 0.81);
    let verifier = ClaimVerifier::new(store, Arc::new(similarity));

    let results = verifier
        .verify(&claims(&["independently audited compliance posture"]), &ids)
        .await;

    let r = &results[0];
    assert!(r.supported);
    assert_eq!(r.source_id.as_deref(), Some("chunk_security"));
    assert_eq!(r.quoted_span, None);
}

#[tokio::test]
async fn sub_threshold_match_is_never_surfaced() {
    let (store, ids) = corpus();
    let similarity = FixedSimilarity::new(0.0).with_rule("customers", "customers", 0.69);
    let verifier = ClaimVerifier::new(store, Arc::new(similarity));

    let results = verifier
        .verify(&claims(&["over 18,000 customers"]), &ids)
        .await;

    let r = &results[0];
    assert!(!r.supported);
    assert_eq!(r.similarity, 0.69);
    assert_eq!(r.source_id, None);
    assert_eq!(r.quoted_span, None);
}

#[tokio::test]
async fn ties_keep_first_candidate() {
    let (store, _) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(FixedSimilarity::new(0.9)));

    let forward = verifier
        .verify(
            &claims(&["any claim"]),
            &claims(&["chunk_security", "chunk_customers"]),
        )
        .await;
    let reverse = verifier
        .verify(
            &claims(&["any claim"]),
            &claims(&["chunk_customers", "chunk_security"]),
        )
        .await;

    assert_eq!(forward[0].source_id.as_deref(), Some("chunk_security"));
    assert_eq!(reverse[0].source_id.as_deref(), Some("chunk_customers"));
}

#[tokio::test]
async fn verify_is_idempotent() {
    let (store, ids) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(LexicalSimilarity));
    let input = claims(&[
        "Acme Cloud integrates with Slack",
        "encrypts all data at rest",
    ]);

    let first = verifier.verify(&input, &ids).await;
    let second = verifier.verify(&input, &ids).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn store_outage_degrades_to_unsupported() {
    let verifier = ClaimVerifier::new(
        Arc::new(FailingChunkStore),
        Arc::new(FixedSimilarity::new(1.0)),
    );

    let results = verifier
        .verify(&claims(&["18,000 customers"]), &claims(&["chunk_customers"]))
        .await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].supported);
}

struct BrokenSimilarity;

#[async_trait]
impl SimilarityService for BrokenSimilarity {
    async fn similarity(&self, _a: &str, _b: &str) -> brandguard_similarity::Result<f64> {
        Err(SimilarityError::NotConfigured("offline".to_string()))
    }
}

#[tokio::test]
async fn similarity_errors_score_zero() {
    let (store, ids) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(BrokenSimilarity));

    let results = verifier
        .verify(&claims(&["18,000 customers"]), &ids)
        .await;

    assert!(!results[0].supported);
    assert_eq!(results[0].similarity, 0.0);
}

#[tokio::test]
async fn threshold_is_configurable() {
    let (store, ids) = corpus();
    let similarity = FixedSimilarity::new(0.0).with_rule("customers", "customers", 0.6);
    let verifier = ClaimVerifier::new(store, Arc::new(similarity)).with_config(VerifierConfig {
        support_threshold: 0.5,
        ..VerifierConfig::default()
    });

    let results = verifier
        .verify(&claims(&["over 18,000 customers"]), &ids)
        .await;
    assert!(results[0].supported);
    assert_eq!(
        results[0].quoted_span.as_deref(),
        Some("over 18,000 customers")
    );
}

#[tokio::test]
async fn no_claims_no_results() {
    let (store, ids) = corpus();
    let verifier = ClaimVerifier::new(store, Arc::new(LexicalSimilarity));
    assert!(verifier.verify(&[], &ids).await.is_empty());
}
