use chrono::{TimeZone, Utc};
use serde_json::json;
use veracity_extract::prelude::*;
use veracity_extract::repair::{clamp_score, repair_details, score_prefix};
use veracity_extract::{BoundaryStrategy, FailureKind, RecordStatus, VerificationRecord};

fn context() -> RecordContext {
    let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
    RecordContext::at("integration", timestamp).with_model("gpt-4o")
}

#[test]
fn test_revalidation_is_idempotent_for_verification() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let replies = [
        "{\"score\": 42.5, \"details\": \"Mixed evidence\"}",
        "Verdict: {\"score\": 150, \"details\": \"Veracity Score: 150 - overclaimed\"}",
        "```json\n{\"score\": \"-5\", \"details\": \"Veracity Score: -5 - fabricated\"}\n```",
    ];

    for reply in replies {
        let first = engine.extract_verification(reply, &ctx).unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = engine.extract_verification(&serialized, &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
    }
}

#[test]
fn test_revalidation_is_idempotent_for_content() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let reply = json!({
        "content": "Tides follow the moon.",
        "structure": ["Overview"],
        "metadata": {"citations": ["NOAA"], "tone": "calm"}
    })
    .to_string();

    for variant in [
        ContentSchemaVariant::Plain,
        ContentSchemaVariant::WithWordCount,
        ContentSchemaVariant::Factual,
    ] {
        let first = engine.extract_content(&reply, variant, &ctx).unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = engine.extract_content(&serialized, variant, &ctx).unwrap();
        assert_eq!(first, second, "variant {variant:?}");
    }
}

#[test]
fn test_score_clamp_totality() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    for (input, expected) in [(150.0, 100.0), (-5.0, 0.0), (42.5, 42.5), (1e300, 100.0)] {
        let reply = json!({"score": input, "details": "x"}).to_string();
        let record = engine.extract_verification(&reply, &ctx).unwrap();
        assert!((record.score - expected).abs() < f64::EPSILON, "{input}");
        assert!((0.0..=100.0).contains(&record.score));
    }
    for value in [-1e9, -0.5, 0.0, 0.25, 99.99, 100.0, 100.01, f64::MAX] {
        assert!((0.0..=100.0).contains(&clamp_score(value)));
    }
}

#[test]
fn test_consistency_repair_invariant() {
    let details = [
        "Veracity Score: 12 - wrong number",
        "veracity score: 99.9: shouting",
        "no prefix at all",
        "",
        "Veracity Score: - dangling",
    ];
    for score in [0.0, 42.5, 100.0] {
        for input in details {
            let repaired = repair_details(score, input);
            assert!(repaired.starts_with(&score_prefix(score)), "{repaired:?}");
        }
    }

    let engine = ExtractionEngine::new();
    let record = engine
        .extract_verification(
            "{\"score\": 30, \"details\": \"Veracity Score: 90 - claims are weak\"}",
            &context(),
        )
        .unwrap();
    assert_eq!(
        record,
        VerificationRecord {
            score: 30.0,
            details: "Veracity Score: 30 - claims are weak".to_string(),
        }
    );
}

#[test]
fn test_boundary_tolerance() {
    let engine = ExtractionEngine::new();
    let reply = "Sure! Here you go:\n```json\n{\"content\":\"hi\"}\n```\nHope that helps!";
    let record = engine
        .extract_content(reply, ContentSchemaVariant::Plain, &context())
        .unwrap();
    assert_eq!(record.content, "hi");
    assert_eq!(record.metadata.word_count, 1);
}

#[test]
fn test_nested_braces_inside_strings() {
    let engine = ExtractionEngine::new();
    let record = engine
        .extract_content(
            "{\"content\":\"a {b} c\"}",
            ContentSchemaVariant::Plain,
            &context(),
        )
        .unwrap();
    assert_eq!(record.content, "a {b} c");

    let record = engine
        .extract_content(
            "Answer: {\"content\":\"a } c\"} (note: {sic})",
            ContentSchemaVariant::Plain,
            &context(),
        )
        .unwrap();
    assert_eq!(record.content, "a } c");
}

#[test]
fn test_naive_scan_limitation_is_documented_behaviour() {
    let naive = ExtractionEngine::with_config(
        ExtractionConfig::default().with_boundary(BoundaryStrategy::Naive),
    );
    let failure = naive
        .extract_content(
            "Answer: {\"content\":\"hi\"} (note: {sic})",
            ContentSchemaVariant::Plain,
            &context(),
        )
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::JsonDecodeFailure);
}

#[test]
fn test_missing_field_failure() {
    let failure = ExtractionEngine::new()
        .extract_verification("{\"foo\":\"bar\"}", &context())
        .unwrap_err();
    assert_eq!(failure.status, RecordStatus::Failed);
    assert_eq!(failure.kind, FailureKind::MissingField);
    assert_eq!(failure.metadata.topic, "integration");

    let value = serde_json::to_value(&failure).unwrap();
    assert_eq!(value["status"], "FAILED");
    assert!(value.get("score").is_none());
}

#[test]
fn test_no_json_failure() {
    let failure = ExtractionEngine::new()
        .extract_verification("I cannot comply with this request.", &context())
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::NoJsonFound);
}

#[test]
fn test_array_reply_fails_the_same_bare_or_fenced() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let array = "[{\"score\": 5, \"details\": \"x\"}]";

    for reply in [array.to_string(), format!("```json\n{array}\n```")] {
        let failure = engine.extract_verification(&reply, &ctx).unwrap_err();
        assert_eq!(failure.kind, FailureKind::UnexpectedShape, "reply {reply:?}");
    }
}

#[test]
fn test_word_count_authority() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let plain = engine
        .extract_content("{\"content\": \"one two three\"}", ContentSchemaVariant::Plain, &ctx)
        .unwrap();
    assert_eq!(plain.metadata.word_count, 3);

    let conflicting = json!({"content": "one two three", "word_count": 12, "metadata": {"word_count": 40}})
        .to_string();
    for variant in [ContentSchemaVariant::Plain, ContentSchemaVariant::Factual] {
        let record = engine.extract_content(&conflicting, variant, &ctx).unwrap();
        assert_eq!(record.metadata.word_count, 3, "variant {variant:?}");
    }
}

#[test]
fn test_shape_dispatch_matches_typed_operations() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let reply = "{\"score\": 55, \"details\": \"ok\"}";
    let typed = engine.extract_verification(reply, &ctx).unwrap();
    match engine.extract(reply, RecordShape::Verification, &ctx).unwrap() {
        ValidatedRecord::Verification(record) => assert_eq!(record, typed),
        ValidatedRecord::Content(_) => panic!("expected a verification record"),
    }
}

#[test]
fn test_failures_never_carry_partial_records() {
    let engine = ExtractionEngine::new();
    let ctx = context();
    let failure = engine
        .extract(
            "{\"content\": 3, \"structure\": [\"a\"]}",
            RecordShape::Content(ContentSchemaVariant::Factual),
            &ctx,
        )
        .unwrap_err();
    let value = serde_json::to_value(&failure).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 4);
    for key in ["status", "error", "kind", "metadata"] {
        assert!(keys.contains(&key));
    }
    assert_eq!(
        value["metadata"].as_object().unwrap().len(),
        2,
        "failure metadata holds only topic and timestamp"
    );
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(ExtractionEngine::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                let reply = json!({"score": i * 10, "details": "thread"}).to_string();
                engine
                    .extract_verification(&reply, &RecordContext::new(format!("t{i}")))
                    .map(|record| record.score)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let score = handle.join().unwrap().unwrap();
        assert!((score - (i as f64) * 10.0).abs() < f64::EPSILON);
    }
}
