// Text-completion trait — the swap-ready abstraction over the language model.
//
// Everything that talks to a model (attribute extraction, topic unification,
// generation) goes through this trait, so tests can inject a scripted fake
// and the HTTP provider can change without touching the pipeline.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// A service that turns a prompt into generated text.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Complete a prompt. Network, auth, rate-limit and server errors all map
    /// to `QuillError::CollaboratorUnavailable`. `timeout` is a hint the
    /// implementation should pass on to its transport; callers enforce it
    /// regardless via `complete_within`.
    async fn complete(&self, prompt: &str, timeout: Option<Duration>) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
