// Error taxonomy for the extraction and generation pipeline.
//
// Library code returns QuillError so callers can match on the failure kind
// (the CLI reports it; tests assert on it). Application code in main.rs
// still uses anyhow and wraps these with context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuillError {
    /// Empty or malformed input handed to a component.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The text-completion service was unreachable, errored, or timed out.
    #[error("Text-completion service unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The text-completion service answered with nothing usable.
    #[error("Text-completion service returned an empty response")]
    EmptyResponse,

    /// An attribute reply could not be parsed. Recovered inside the
    /// extractor and never returned from a public pipeline call.
    #[error("Could not parse attribute reply: {0}")]
    Parse(String),

    /// The post store failed underneath us.
    #[error("Post store error: {0}")]
    Store(String),
}

impl QuillError {
    /// Wrap an anyhow error from a store backend, keeping its context chain.
    pub fn store(err: anyhow::Error) -> Self {
        QuillError::Store(format!("{err:#}"))
    }

    /// Short machine-friendly name for the error kind (used in logs and output).
    pub fn kind(&self) -> &'static str {
        match self {
            QuillError::InvalidInput(_) => "invalid_input",
            QuillError::CollaboratorUnavailable(_) => "collaborator_unavailable",
            QuillError::EmptyResponse => "empty_response",
            QuillError::Parse(_) => "parse",
            QuillError::Store(_) => "store",
        }
    }
}

pub type Result<T, E = QuillError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("disk full").context("Failed to insert post");
        let err = QuillError::store(inner);
        let msg = err.to_string();
        assert!(msg.contains("Failed to insert post"));
        assert!(msg.contains("disk full"));
        assert_eq!(err.kind(), "store");
    }
}
