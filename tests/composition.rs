// Composition tests — the full build and generate pipelines chained together.
//
//   texts -> ingest (extract -> unify -> store) -> select -> prompt -> generate
//
// A scripted completer stands in for the model: classification prompts and
// generation prompts are told apart by their fixed instruction text.

use std::sync::Arc;
use std::time::Duration;

use quill::completion::scripted::ScriptedCompleter;
use quill::error::QuillError;
use quill::extract::llm::AttributeExtractor;
use quill::generate::Generator;
use quill::model::{GenerationRequest, LengthBucket, UNKNOWN};
use quill::pipeline::{compose, ingest};
use quill::select::LadderStep;
use quill::store::{MemoryStore, PostFilter, PostStore};

const CLASSIFY: &str = "Classify it.";
const TIMEOUT: Duration = Duration::from_secs(2);

fn extractor(completer: &Arc<ScriptedCompleter>) -> AttributeExtractor {
    AttributeExtractor::new(completer.clone(), TIMEOUT)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// Scenario: single photography post
// ============================================================

#[tokio::test]
async fn photography_post_round_trip() {
    let model = Arc::new(
        ScriptedCompleter::new("Chasing golden hour again. #photography").on(
            CLASSIFY,
            r#"{"topic": "photography", "language": "en", "length": "short"}"#,
        ),
    );
    let store = MemoryStore::new();

    let report = ingest::run(
        strings(&["I love sunsets! #photography"]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(report.stored, 1);

    let request = GenerationRequest::new(
        Some("photography".into()),
        Some("en".into()),
        Some(LengthBucket::Short),
    );
    let generator = Generator::new(model.clone(), TIMEOUT);
    let post = compose::run(&request, 3, &store, &generator).await.unwrap();

    assert_eq!(post.selection_step, LadderStep::Exact);
    assert_eq!(post.examples.len(), 1);
    assert_eq!(post.examples[0].text, "I love sunsets! #photography");
    assert_eq!(post.text, "Chasing golden hour again. #photography");

    let prompts = model.prompts();
    let generation_prompt = prompts.last().unwrap();
    assert!(!generation_prompt.contains(CLASSIFY));
    assert!(generation_prompt.contains("photography"));
    assert!(generation_prompt.contains("I love sunsets! #photography"));
}

// ============================================================
// Ingestion behaviour
// ============================================================

#[tokio::test]
async fn ingested_post_is_found_by_its_own_attributes() {
    let model = Arc::new(ScriptedCompleter::new(
        r#"{"topic": "Fitness", "language": "EN"}"#,
    ));
    let store = MemoryStore::new();
    ingest::run(
        strings(&["Leg day. No excuses."]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();

    let stored = store.all().await.unwrap().remove(0);
    let found = store
        .filter(&PostFilter::exact(&stored.attributes()))
        .await
        .unwrap();
    assert_eq!(found, vec![stored]);
}

#[tokio::test]
async fn empty_posts_are_skipped_and_the_rest_continue() {
    let model = Arc::new(ScriptedCompleter::new(r#"{"topic": "x", "language": "en"}"#));
    let store = MemoryStore::new();
    let report = ingest::run(
        strings(&["first", "", "   ", "last"]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.stored, 2);
    assert_eq!(report.skipped_empty, 2);
    // Empty posts never reach the model.
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn failed_classification_is_stored_with_defaults() {
    let model = Arc::new(
        ScriptedCompleter::new(r#"{"topic": "cooking", "language": "en"}"#)
            .fail_on("flaky post", "503 Service Unavailable"),
    );
    let store = MemoryStore::new();
    let report = ingest::run(
        strings(&["pasta night", "flaky post here", "bread again"]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.stored, 3);
    assert_eq!(report.defaulted, 1);

    let posts = store.all().await.unwrap();
    assert_eq!(posts[1].text, "flaky post here");
    assert_eq!(posts[1].topic, UNKNOWN);
    assert_eq!(posts[1].language, UNKNOWN);
    assert_eq!(posts[1].length_bucket, LengthBucket::Short);
    assert_eq!(posts[0].topic, "cooking");
}

#[tokio::test]
async fn concurrent_ingestion_keeps_corpus_order() {
    let model = Arc::new(
        ScriptedCompleter::new(r#"{"topic": "t", "language": "en"}"#)
            .with_delay(Duration::from_millis(5)),
    );
    let store = MemoryStore::new();
    let texts: Vec<String> = (0..20).map(|i| format!("post number {i}")).collect();
    let options = ingest::IngestOptions {
        concurrency: 8,
        ..ingest::IngestOptions::default()
    };

    ingest::run(texts.clone(), &extractor(&model), &store, &options)
        .await
        .unwrap();

    let stored: Vec<String> = store.all().await.unwrap().into_iter().map(|p| p.text).collect();
    assert_eq!(stored, texts);
}

#[tokio::test]
async fn unification_rewrites_topics_before_storing() {
    let model = Arc::new(
        ScriptedCompleter::new("")
            .on("list of topic labels", r#"{"trip": "Travel", "Adventure": "Travel"}"#)
            .on("Lisbon", r#"{"topic": "trip", "language": "en"}"#)
            .on("Climbing", r#"{"topic": "Adventure", "language": "en"}"#)
            .on("Soup", r#"{"topic": "Cooking", "language": "en"}"#),
    );
    let store = MemoryStore::new();
    let options = ingest::IngestOptions {
        unify_topics: true,
        ..ingest::IngestOptions::default()
    };

    let report = ingest::run(
        strings(&["Lisbon was lovely", "Climbing day", "Soup season"]),
        &extractor(&model),
        &store,
        &options,
    )
    .await
    .unwrap();

    assert_eq!(report.unified, 2);
    let topics: Vec<String> = store.all().await.unwrap().into_iter().map(|p| p.topic).collect();
    assert_eq!(topics, vec!["Travel", "Travel", "Cooking"]);
}

#[tokio::test]
async fn unification_failure_keeps_original_labels() {
    let model = Arc::new(
        ScriptedCompleter::new("")
            .fail_on("list of topic labels", "rate limited")
            .on("alpha", r#"{"topic": "A", "language": "en"}"#)
            .on("beta", r#"{"topic": "B", "language": "en"}"#),
    );
    let store = MemoryStore::new();
    let options = ingest::IngestOptions {
        unify_topics: true,
        ..ingest::IngestOptions::default()
    };
    let report = ingest::run(strings(&["alpha", "beta"]), &extractor(&model), &store, &options)
        .await
        .unwrap();
    assert_eq!(report.stored, 2);
    assert_eq!(report.unified, 0);
}

// ============================================================
// Scenario: sparse topic relaxes to the whole corpus
// ============================================================

#[tokio::test]
async fn missing_topic_uses_other_posts_as_style() {
    let model = Arc::new(
        ScriptedCompleter::new("A cooking post.")
            .on(CLASSIFY, r#"{"topic": "fitness", "language": "en"}"#),
    );
    let store = MemoryStore::new();
    ingest::run(
        strings(&["Deadlifts today", "Rest day stretch", "5k PR!", "Yoga flow"]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();

    let request = GenerationRequest::new(Some("cooking".into()), Some("en".into()), None);
    let generator = Generator::new(model.clone(), TIMEOUT);
    let post = compose::run(&request, 3, &store, &generator).await.unwrap();

    assert_eq!(post.selection_step, LadderStep::Corpus);
    assert_eq!(post.examples.len(), 3);
    assert!(post.examples.iter().all(|p| p.topic == "fitness"));
    assert!(model.prompts().last().unwrap().contains("Topic: cooking"));
}

// ============================================================
// Failure paths produce no post
// ============================================================

#[tokio::test]
async fn generation_timeout_yields_no_post() {
    let store = MemoryStore::new();
    let slow = Arc::new(ScriptedCompleter::new("late").with_delay(Duration::from_millis(300)));
    let generator = Generator::new(slow, Duration::from_millis(20));

    let result = compose::run(&GenerationRequest::default(), 3, &store, &generator).await;
    assert!(matches!(result, Err(QuillError::CollaboratorUnavailable(_))));
}

#[tokio::test]
async fn empty_generation_is_reported() {
    let store = MemoryStore::new();
    let generator = Generator::new(Arc::new(ScriptedCompleter::new("\n\n")), TIMEOUT);
    let result = compose::run(&GenerationRequest::default(), 3, &store, &generator).await;
    assert!(matches!(result, Err(QuillError::EmptyResponse)));
}

#[tokio::test]
async fn empty_corpus_still_generates_from_constraints() {
    let model = Arc::new(ScriptedCompleter::new("Fresh post."));
    let store = MemoryStore::new();
    let request = GenerationRequest::new(Some("gardening".into()), None, Some(LengthBucket::Long));
    let generator = Generator::new(model.clone(), TIMEOUT);

    let post = compose::run(&request, 2, &store, &generator).await.unwrap();
    assert!(post.examples.is_empty());

    let prompt = &model.prompts()[0];
    assert!(prompt.contains("Topic: gardening"));
    assert!(prompt.contains("Length: long"));
    assert!(!prompt.contains("Example 1"));
}

// ============================================================
// Durable store
// ============================================================

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_store_supports_the_same_pipeline() {
    use quill::store::schema::create_tables;
    use quill::store::sqlite::SqliteStore;

    let conn = rusqlite::Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    let store = SqliteStore::new(conn);

    let model = Arc::new(
        ScriptedCompleter::new("New draft")
            .on(CLASSIFY, r#"{"topic": "photography", "language": "en"}"#),
    );
    ingest::run(
        strings(&["I love sunsets! #photography", "Film grain forever"]),
        &extractor(&model),
        &store,
        &ingest::IngestOptions::default(),
    )
    .await
    .unwrap();

    let request = GenerationRequest::new(Some("PHOTOGRAPHY".into()), None, None);
    let generator = Generator::new(model, TIMEOUT);
    let post = compose::run(&request, 5, &store, &generator).await.unwrap();
    assert_eq!(post.examples.len(), 2);
    assert_eq!(post.examples[0].text, "I love sunsets! #photography");
}
