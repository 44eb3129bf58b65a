// Generator — hand a built prompt to the model and return its text.
//
// No caching and no retries: each call is one fresh request. The reply is
// returned verbatim unless it's blank, in which case the call fails rather
// than producing an empty post.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::completion::complete_within;
use crate::completion::traits::TextCompleter;
use crate::error::{QuillError, Result};

pub struct Generator {
    completer: Arc<dyn TextCompleter>,
    timeout: Duration,
}

impl Generator {
    pub fn new(completer: Arc<dyn TextCompleter>, timeout: Duration) -> Self {
        Self { completer, timeout }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let text = complete_within(self.completer.as_ref(), prompt, self.timeout).await?;

        if text.trim().is_empty() {
            return Err(QuillError::EmptyResponse);
        }

        info!(
            completer = self.completer.name(),
            chars = text.chars().count(),
            "Generated post"
        );
        Ok(text)
    }
}
