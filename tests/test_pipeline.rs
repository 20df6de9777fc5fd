//! Integration tests for the full answer pipeline.
//!
//! All tests run offline: the deterministic hashing embedder replaces the
//! model server, and the dummy generation provider echoes the user turn.
//! The transport-failure test points the OpenAI-compatible provider at a
//! closed local port.

use std::sync::Arc;

use nanodiag::embedding::{Embedder, HashingEmbedder};
use nanodiag::extract::Intent;
use nanodiag::kb::{seed, KnowledgeBase};
use nanodiag::llm::providers::dummy::DummyProvider;
use nanodiag::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use nanodiag::llm::GenerationProvider;
use nanodiag::pipeline::Pipeline;
use nanodiag::retrieve::graph::Relation;
use nanodiag::visual::{COOLANT_SENSOR_IMG, FUSE_BOX_IMG};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn offline_pipeline() -> Pipeline {
    Pipeline::new(
        Arc::new(seed::builtin()),
        Embedder::Hashing(HashingEmbedder::default()),
        GenerationProvider::Dummy(DummyProvider),
        5,
    )
}

fn broken_llm_pipeline() -> Pipeline {
    // Nothing listens on port 9; the generation call fails at transport level.
    let provider = OpenAiCompatibleProvider::new(
        "http://127.0.0.1:9/v1/chat/completions".into(),
        "test-model".into(),
        0.3,
        1,
        None,
    )
    .expect("client builds");
    Pipeline::new(
        Arc::new(seed::builtin()),
        Embedder::Hashing(HashingEmbedder::default()),
        GenerationProvider::OpenAiCompatible(provider),
        5,
    )
}

// ── Scenarios from the service-manual corpus ──────────────────────────────────

#[tokio::test]
async fn continuous_fan_symptom_maps_to_p0117() {
    let answer = offline_pipeline()
        .answer("Fan runs continuously", None)
        .await
        .expect("answer");
    assert!(answer.triples.iter().any(|t| t.subject == "Continuous Fan"
        && t.relation == Relation::Indicates
        && t.object == "P0117"));
    assert_eq!(answer.digest.intent, Intent::General);
}

#[tokio::test]
async fn p0117_details_is_explanation_without_repair_content() {
    let answer = offline_pipeline()
        .answer("P0117 details", None)
        .await
        .expect("answer");
    assert_eq!(answer.digest.intent, Intent::Explanation);
    assert!(answer.triples.iter().all(|t| t.relation != Relation::RepairStep));
    assert!(answer.triples.iter().all(|t| t.relation != Relation::Location));
    // Explanation answers are text-only.
    assert!(!answer.answer_html.contains(COOLANT_SENSOR_IMG));
}

#[tokio::test]
async fn coolant_sensor_picture_request_attaches_bundle() {
    let answer = offline_pipeline()
        .answer("Show me picture of coolant sensor", None)
        .await
        .expect("answer");
    assert_eq!(answer.digest.intent, Intent::ImageRequest);
    assert!(answer.digest.components.contains(&"Coolant Sensor".to_string()));
    assert!(answer.answer_html.contains(COOLANT_SENSOR_IMG));
    assert!(!answer.answer_html.contains(FUSE_BOX_IMG));
}

#[tokio::test]
async fn window_fuse_query_reports_all_three_ratings() {
    let answer = offline_pipeline()
        .answer("Window fuse rating", None)
        .await
        .expect("answer");
    assert!(answer.digest.components.contains(&"Window Motor".to_string()));
    let fuses: Vec<&str> = answer
        .triples
        .iter()
        .filter(|t| t.relation == Relation::Fuse)
        .map(|t| t.object.as_str())
        .collect();
    assert_eq!(fuses, vec!["WW RH 30A", "WW LH 30A", "WW MOTOR 10A"]);
}

// ── Contract properties ───────────────────────────────────────────────────────

#[tokio::test]
async fn passages_are_bounded_and_sorted() {
    let answer = offline_pipeline()
        .answer("coolant temperature circuit fault", None)
        .await
        .expect("answer");
    assert!(answer.passages.len() <= 5);
    for pair in answer.passages.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn triples_are_bounded_and_unique() {
    let answer = offline_pipeline()
        .answer("how to fix P0117 coolant sensor radiator fan continuous fan", None)
        .await
        .expect("answer");
    assert!(answer.triples.len() <= 10);
    let unique: std::collections::HashSet<_> = answer.triples.iter().collect();
    assert_eq!(unique.len(), answer.triples.len());
}

#[tokio::test]
async fn empty_knowledge_base_scores_zero_and_still_answers() {
    let kb = KnowledgeBase::new(vec![], vec![]).expect("empty kb");
    let pipeline = Pipeline::new(
        Arc::new(kb),
        Embedder::Hashing(HashingEmbedder::default()),
        GenerationProvider::Dummy(DummyProvider),
        5,
    );
    let answer = pipeline.answer("P0117 details", None).await.expect("answer");
    assert!(answer.triples.is_empty());
    assert!(answer.passages.is_empty());
    assert_eq!(answer.fusion.combined_score, 0.0);
    // The generation service was still called with no-context markers.
    assert!(!answer.answer_html.is_empty());
}

#[tokio::test]
async fn repeated_answers_are_stable() {
    let pipeline = offline_pipeline();
    let first = pipeline.answer("why is the fan always running", None).await.expect("first");
    let second = pipeline.answer("why is the fan always running", None).await.expect("second");
    let scores = |a: &nanodiag::Answer| a.passages.iter().map(|p| p.score).collect::<Vec<_>>();
    assert_eq!(scores(&first), scores(&second), "cached embeddings keep ranking stable");
    assert_eq!(first.answer_html, second.answer_html);
}

// ── Failure handling ──────────────────────────────────────────────────────────

#[tokio::test]
async fn generation_transport_failure_degrades_to_apology() {
    let answer = broken_llm_pipeline()
        .answer("P0117 details", None)
        .await
        .expect("pipeline must not propagate generation failures");
    assert!(!answer.answer_html.is_empty());
    assert!(answer.answer_html.contains("Error generating response"));
    // Retrieval evidence is still reported alongside the degraded answer.
    assert!(!answer.triples.is_empty());
}

#[tokio::test]
async fn out_of_scope_query_gets_fixed_advisory() {
    let answer = offline_pipeline()
        .answer("write a java program for sorting", None)
        .await
        .expect("answer");
    assert!(answer.answer_html.contains("Out of Scope"));
    assert!(answer.triples.is_empty());
    assert!(answer.passages.is_empty());
}

// ── Session topic ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_topic_round_trip() {
    let pipeline = offline_pipeline();

    let first = pipeline.answer("P0117 is showing, what does this mean?", None).await.expect("first");
    assert_eq!(first.digest.intent, Intent::Explanation);
    assert_eq!(first.new_session_context.as_deref(), Some("P0117"));

    let second = pipeline
        .answer("how do I fix it?", first.new_session_context.as_deref())
        .await
        .expect("second");
    assert_eq!(second.digest.intent, Intent::Repair);
    assert!(second.triples.iter().any(|t| t.relation == Relation::RepairStep),
        "session topic should route the follow-up to P0117 repair steps");
    assert_eq!(second.new_session_context.as_deref(), Some("P0117"));
}
