use brandguard_core::{ChannelLimit, CritiqueConfig, CritiqueEngine};

#[test]
fn overlong_web_copy_reports_overage() {
    let engine = CritiqueEngine::default();
    let body = "A".repeat(400);

    let report = engine.critique("web", None, &body, "Register now", &[]);

    assert!(!report.length_ok);
    assert!(!report.passed);
    assert_eq!(report.char_count, 412);
    assert_eq!(report.max_chars, 300);
    assert!(report
        .issues
        .iter()
        .any(|i| i == "Content exceeds web limit: 412/300 chars"));
    assert!(report
        .suggestions
        .iter()
        .any(|s| s == "Reduce content by 112 characters"));
    assert!(report.feedback.starts_with("FAIL:"));
}

#[test]
fn buzzword_heavy_linkedin_post_fails_both_scores() {
    let engine = CritiqueEngine::default();

    let report = engine.critique(
        "linkedin",
        Some("Revolutionary Game-Changing Paradigm"),
        "Our platform leverages synergy to deliver best-in-class results.",
        "Click here",
        &[],
    );

    assert!(report.brand_voice_score < 7);
    assert!(report.cta_clarity_score < 7);
    assert!(!report.passed);
    assert!(report
        .issues
        .iter()
        .any(|i| i.starts_with("Contains 6 buzzwords")));
    assert!(report
        .suggestions
        .iter()
        .any(|s| s == "Remove buzzwords: revolutionary, game-changing, synergy"));
    assert!(report.issues.iter().any(|i| i == "CTA lacks clear action verb"));
}

#[test]
fn direct_actionable_copy_passes() {
    let engine = CritiqueEngine::default();

    let report = engine.critique(
        "linkedin",
        Some("Build secure pipelines together"),
        "Join your peers and learn how teams transform delivery.",
        "Register for the webinar",
        &["teams ship faster".to_string()],
    );

    assert_eq!(report.brand_voice_score, 9);
    assert_eq!(report.cta_clarity_score, 8);
    assert!(report.length_ok);
    assert!(report.passed);
    assert!(report.issues.is_empty());
    assert_eq!(report.feedback, "PASS: Content meets quality standards.");
    assert_eq!(report.claims_declared, 1);

    let card = report.scorecard();
    assert!(card.passed);
    assert_eq!(card.char_count, report.char_count);
}

#[test]
fn positive_tiers_break_toward_lower_score() {
    let engine = CritiqueEngine::default();
    let score = |body: &str| {
        engine
            .critique("facebook", None, body, "Join us today", &[])
            .brand_voice_score
    };

    assert_eq!(score("Nothing here."), 6);
    assert_eq!(score("Teams meet."), 7);
    assert_eq!(score("Teams meet together."), 8);
    assert_eq!(score("Teams build together."), 9);
    // A single buzzword blocks the top tier.
    assert_eq!(score("Teams build together with synergy."), 8);
}

#[test]
fn critique_is_pure() {
    let engine = CritiqueEngine::default();
    let args = (
        "email",
        Some("Your invite to the AI summit"),
        "You will learn how teams improve delivery.",
        "Reserve your seat",
    );

    let first = engine.critique(args.0, args.1, args.2, args.3, &[]);
    let second = engine.critique(args.0, args.1, args.2, args.3, &[]);
    assert_eq!(first, second);
}

#[test]
fn substitute_limit_table() {
    let mut config = CritiqueConfig::default();
    config
        .channel_limits
        .insert("sms".to_string(), ChannelLimit::new(20));
    let engine = CritiqueEngine::new(config);

    let report = engine.critique("sms", None, "You learn fast here", "Join now", &[]);
    assert!(!report.length_ok);
    assert_eq!(report.max_chars, 20);
}
