//! Behavioural contract shared by all similarity services.

use brandguard_similarity::{FixedSimilarity, LexicalSimilarity, SimilarityService};

async fn assert_bounded_and_deterministic(service: &dyn SimilarityService) {
    let pairs = [
        ("Over 18,000 customers", "18,000 customers trust our platform"),
        ("", "empty left side"),
        ("unrelated", "completely different words"),
    ];
    for (a, b) in pairs {
        let first = service.similarity(a, b).await.unwrap();
        let second = service.similarity(a, b).await.unwrap();
        assert!((0.0..=1.0).contains(&first), "{first} out of range for {a:?}/{b:?}");
        assert_eq!(first.to_bits(), second.to_bits());
    }
}

#[tokio::test]
async fn lexical_similarity_honours_contract() {
    assert_bounded_and_deterministic(&LexicalSimilarity::new()).await;
}

#[tokio::test]
async fn fixed_similarity_honours_contract() {
    let sim = FixedSimilarity::new(0.2).with_rule("18,000", "customers", 0.95);
    assert_bounded_and_deterministic(&sim).await;
}
