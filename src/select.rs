// Example selection — the relaxation ladder.
//
// We want past posts that look like the one being requested. The ladder
// starts with every requested attribute and drops one criterion per rung:
//
//   Exact          topic + language + length (whichever are set)
//   TopicLanguage  topic + language
//   Topic          topic
//   Corpus         everything
//
// The first rung that finds anything wins, and later rungs are never
// queried. Results keep insertion order and are cut to `max_examples`.
// Each rung's filter is its own function so the policy can be tested in
// isolation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{QuillError, Result};
use crate::model::{GenerationRequest, Post};
use crate::store::{PostFilter, PostStore};

/// One rung of the ladder, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderStep {
    Exact,
    TopicLanguage,
    Topic,
    Corpus,
}

impl LadderStep {
    pub const LADDER: [LadderStep; 4] = [
        LadderStep::Exact,
        LadderStep::TopicLanguage,
        LadderStep::Topic,
        LadderStep::Corpus,
    ];

    /// The filter this rung applies for a request.
    pub fn filter(&self, request: &GenerationRequest) -> PostFilter {
        match self {
            LadderStep::Exact => exact_filter(request),
            LadderStep::TopicLanguage => topic_language_filter(request),
            LadderStep::Topic => topic_filter(request),
            LadderStep::Corpus => corpus_filter(request),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LadderStep::Exact => "exact match",
            LadderStep::TopicLanguage => "topic + language",
            LadderStep::Topic => "topic only",
            LadderStep::Corpus => "whole corpus",
        }
    }
}

impl fmt::Display for LadderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rung 1: every attribute the request sets.
pub fn exact_filter(request: &GenerationRequest) -> PostFilter {
    PostFilter {
        topic: request.topic.clone(),
        language: request.language.clone(),
        length_bucket: request.length_bucket,
    }
}

/// Rung 2: drop the length bucket.
pub fn topic_language_filter(request: &GenerationRequest) -> PostFilter {
    PostFilter {
        topic: request.topic.clone(),
        language: request.language.clone(),
        length_bucket: None,
    }
}

/// Rung 3: topic only.
pub fn topic_filter(request: &GenerationRequest) -> PostFilter {
    PostFilter {
        topic: request.topic.clone(),
        ..PostFilter::any()
    }
}

/// Rung 4: no filter at all.
pub fn corpus_filter(_request: &GenerationRequest) -> PostFilter {
    PostFilter::any()
}

/// The examples picked for a request and the rung that produced them.
#[derive(Debug, Clone)]
pub struct Selection {
    pub examples: Vec<Post>,
    pub step: LadderStep,
}

/// Walk the ladder and return up to `max_examples` posts.
///
/// Never fails on a sparse corpus: it returns zero posts only when the store
/// is empty. Store errors are surfaced as `QuillError::Store`.
pub async fn select(
    store: &dyn PostStore,
    request: &GenerationRequest,
    max_examples: usize,
) -> Result<Selection> {
    if max_examples == 0 {
        return Err(QuillError::InvalidInput(
            "max_examples must be at least 1".to_string(),
        ));
    }

    let mut previous: Option<PostFilter> = None;

    for step in LadderStep::LADDER {
        let filter = step.filter(request);

        // An unset attribute makes two rungs identical; don't ask twice.
        if previous.as_ref() == Some(&filter) {
            continue;
        }

        let mut matches = store.filter(&filter).await.map_err(QuillError::store)?;
        debug!(step = %step, matches = matches.len(), "Ladder rung evaluated");

        if !matches.is_empty() {
            matches.truncate(max_examples);
            return Ok(Selection {
                examples: matches,
                step: reported_step(step, &filter),
            });
        }
        previous = Some(filter);
    }

    Ok(Selection {
        examples: Vec::new(),
        step: LadderStep::Corpus,
    })
}

/// The rung to report for a filter that found posts. An unfiltered query is
/// the whole corpus, whichever rung position it ran at.
fn reported_step(step: LadderStep, filter: &PostFilter) -> LadderStep {
    if filter.is_unfiltered() {
        LadderStep::Corpus
    } else {
        step
    }
}
