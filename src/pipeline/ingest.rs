// Corpus ingestion pipeline: raw texts -> attributes -> store.
//
// 1. Classify every post, several at a time. `buffered` (not
//    `buffer_unordered`) yields results in corpus order.
// 2. Optionally unify topic labels across the batch.
// 3. Insert sequentially, in original order.
//
// An empty post is skipped. A post whose classification call failed is
// still stored, with `unknown` labels and a locally computed length.

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{QuillError, Result};
use crate::extract::llm::AttributeExtractor;
use crate::extract::unify;
use crate::model::{Post, PostAttributes};
use crate::output::truncate_chars;
use crate::store::PostStore;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// How many classification calls may be in flight at once.
    pub concurrency: usize,
    /// Merge near-duplicate topic labels before storing.
    pub unify_topics: bool,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            unify_topics: false,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Posts written to the store.
    pub stored: usize,
    /// Posts skipped because their text was empty.
    pub skipped_empty: usize,
    /// Stored posts that got default attributes because classification failed.
    pub defaulted: usize,
    /// Stored posts whose topic was rewritten by unification.
    pub unified: usize,
}

/// Run the ingestion pipeline over a batch of raw post texts.
pub async fn run(
    texts: Vec<String>,
    extractor: &AttributeExtractor,
    store: &dyn PostStore,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let total = texts.len();

    let pb = if options.show_progress {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  Classifying [{bar:30}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    // Phase 1: classify, bounded concurrency, corpus order preserved.
    let outcomes: Vec<(String, Result<PostAttributes>)> =
        stream::iter(texts.into_iter().map(|text| {
            let pb = pb.clone();
            async move {
                let outcome = extractor.extract(&text).await;
                pb.inc(1);
                (text, outcome)
            }
        }))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    let mut classified: Vec<(String, PostAttributes)> = Vec::with_capacity(outcomes.len());
    for (index, (text, outcome)) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(attributes) => classified.push((text, attributes)),
            Err(QuillError::InvalidInput(reason)) => {
                warn!(index, reason = %reason, "Skipping post");
                report.skipped_empty += 1;
            }
            Err(e) => {
                warn!(
                    index,
                    kind = e.kind(),
                    error = %e,
                    preview = %truncate_chars(&text, 60),
                    "Classification failed, storing with default attributes"
                );
                report.defaulted += 1;
                let attributes = PostAttributes::fallback(&text);
                classified.push((text, attributes));
            }
        }
    }

    // Phase 2: topic unification across the whole batch.
    let mapping = if options.unify_topics {
        let topics: Vec<String> = classified.iter().map(|(_, a)| a.topic.clone()).collect();
        match unify::unify_topics(extractor.completer().as_ref(), &topics, extractor.timeout())
            .await
        {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(error = %e, "Topic unification failed, keeping original labels");
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    // Phase 3: serialized inserts in corpus order.
    for (text, mut attributes) in classified {
        let unified = unify::apply(&mapping, &attributes.topic).to_string();
        if unified != attributes.topic {
            report.unified += 1;
            attributes.topic = unified;
        }

        let post = match Post::new(text, attributes) {
            Ok(post) => post,
            Err(e) => {
                warn!(error = %e, "Skipping post");
                report.skipped_empty += 1;
                continue;
            }
        };
        store.add(post).await.map_err(QuillError::store)?;
        report.stored += 1;
    }

    info!(
        total,
        stored = report.stored,
        skipped = report.skipped_empty,
        defaulted = report.defaulted,
        unified = report.unified,
        "Ingestion complete"
    );

    Ok(report)
}
