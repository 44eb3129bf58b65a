// Topic unification — merge near-duplicate topic labels across a batch.
//
// Per-post extraction produces labels like "Travel", "trip", "Adventure".
// After a batch is classified we ask the model once for a mapping from each
// label to a shorter, Title Case set. This runs before posts are stored, so
// stored posts never change afterwards.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{info, warn};

use crate::completion::complete_within;
use crate::completion::traits::TextCompleter;
use crate::error::Result;
use crate::model::UNKNOWN;

const UNIFY_TEMPLATE: &str = "\
I will give you a list of topic labels. Unify them with the following requirements:
1. Labels are merged into a shorter list.
   Example 1: \"Self-Love\", \"Confidence\" can be merged into \"Self-Love & Confidence\".
   Example 2: \"Travel\", \"Adventure\", \"trip\" can be mapped to \"Travel & Adventure\".
2. Each unified label uses Title Case, for example \"Motivation\", \"Job Search\".
3. Output a JSON object. No preamble.
4. The object maps every original label to its unified label,
   for example {\"Travel\": \"Travel & Adventure\", \"trip\": \"Travel & Adventure\"}.

Here is the list of labels:
{labels}";

pub fn unification_prompt(labels: &[String]) -> String {
    UNIFY_TEMPLATE.replace("{labels}", &labels.join(", "))
}

/// Ask the model for a label → unified label mapping.
///
/// Returns an empty map when there's nothing to unify or the reply can't be
/// parsed. Collaborator failures are returned so the caller can decide
/// whether to carry on without unification.
pub async fn unify_topics(
    completer: &dyn TextCompleter,
    topics: &[String],
    timeout: Duration,
) -> Result<HashMap<String, String>> {
    let labels: Vec<String> = topics
        .iter()
        .filter(|t| !t.eq_ignore_ascii_case(UNKNOWN))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // One label (or none) has nothing to merge with.
    if labels.len() < 2 {
        return Ok(HashMap::new());
    }

    let reply = complete_within(completer, &unification_prompt(&labels), timeout).await?;
    let mapping = parse_mapping(&reply, &labels);

    info!(
        labels = labels.len(),
        mapped = mapping.len(),
        unified = mapping.values().collect::<BTreeSet<_>>().len(),
        "Unified topic labels"
    );

    Ok(mapping)
}

/// Read the JSON mapping, keeping only entries for labels we asked about
/// and with a non-empty target.
fn parse_mapping(reply: &str, labels: &[String]) -> HashMap<String, String> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        warn!("Topic unification reply contained no JSON object");
        return HashMap::new();
    };
    if end <= start {
        return HashMap::new();
    }

    let raw: HashMap<String, serde_json::Value> = match serde_json::from_str(&reply[start..=end]) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Topic unification reply was not valid JSON");
            return HashMap::new();
        }
    };

    // Keys are matched back to the labels we sent ignoring case; the map is
    // keyed by the sent label so `apply` finds it.
    raw.into_iter()
        .filter_map(|(key, target)| {
            let label = labels.iter().find(|l| l.eq_ignore_ascii_case(key.trim()))?;
            let target = target.as_str()?.trim().to_string();
            (!target.is_empty()).then(|| (label.clone(), target))
        })
        .collect()
}

/// Apply a mapping to a label, falling back to the label itself.
pub fn apply<'a>(mapping: &'a HashMap<String, String>, topic: &'a str) -> &'a str {
    mapping.get(topic).map(String::as_str).unwrap_or(topic)
}
