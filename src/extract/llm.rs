// LLM-backed attribute extractor.
//
// One completion call per post with a fixed classification template. The
// reply goes through parse::resolve, so a confused model degrades to
// `unknown` labels instead of an error. Only an empty post or an unreachable
// model fails the call.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::parse;
use crate::completion::complete_within;
use crate::completion::traits::TextCompleter;
use crate::error::{QuillError, Result};
use crate::model::PostAttributes;

const CLASSIFY_TEMPLATE: &str = "\
You are given a social-media post. Classify it.
1. Return a valid JSON object. No preamble.
2. The JSON object must have exactly three keys: topic, language, length.
3. topic is a single short label (one to three words) for the main subject of the post.
4. language is the language the post is written in, as an ISO 639-1 code such as \"en\", \
or a short name such as \"Hinglish\" when languages are mixed.
5. length is one of \"short\", \"medium\", \"long\".

Here is the post:
{post}";

/// Build the classification prompt for one post.
pub fn classification_prompt(text: &str) -> String {
    CLASSIFY_TEMPLATE.replace("{post}", text)
}

pub struct AttributeExtractor {
    completer: Arc<dyn TextCompleter>,
    timeout: Duration,
}

impl AttributeExtractor {
    pub fn new(completer: Arc<dyn TextCompleter>, timeout: Duration) -> Self {
        Self { completer, timeout }
    }

    /// Classify a post. The returned length bucket is always computed locally.
    pub async fn extract(&self, text: &str) -> Result<PostAttributes> {
        if text.trim().is_empty() {
            return Err(QuillError::InvalidInput(
                "cannot extract attributes from empty text".to_string(),
            ));
        }

        let prompt = classification_prompt(text);
        let reply = complete_within(self.completer.as_ref(), &prompt, self.timeout).await?;
        let attributes = parse::resolve(text, &reply);

        debug!(
            topic = %attributes.topic,
            language = %attributes.language,
            length = %attributes.length_bucket,
            "Extracted post attributes"
        );

        Ok(attributes)
    }

    pub fn completer(&self) -> &Arc<dyn TextCompleter> {
        &self.completer
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
