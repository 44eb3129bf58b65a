// Text-completion collaborator — trait, HTTP provider, and a scripted fake.

pub mod openai;
pub mod scripted;
pub mod traits;

use std::time::Duration;
use tracing::warn;

use crate::error::{QuillError, Result};
use traits::TextCompleter;

/// Run one completion, failing with `CollaboratorUnavailable` if it takes
/// longer than `timeout`. The timeout is also handed to the completer so an
/// HTTP client can abort the request at the transport level.
pub async fn complete_within(
    completer: &dyn TextCompleter,
    prompt: &str,
    timeout: Duration,
) -> Result<String> {
    match tokio::time::timeout(timeout, completer.complete(prompt, Some(timeout))).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                completer = completer.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Completion timed out"
            );
            Err(QuillError::CollaboratorUnavailable(format!(
                "{} did not respond within {:?}",
                completer.name(),
                timeout
            )))
        }
    }
}
