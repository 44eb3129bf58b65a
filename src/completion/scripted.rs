// Scripted completer — a deterministic stand-in for the language model.
//
// Replies are chosen by the first rule whose needle appears in the prompt,
// otherwise the default reply is used. Every prompt is recorded so tests can
// assert on what the pipeline actually sent.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::traits::TextCompleter;
use crate::error::{QuillError, Result};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

pub struct ScriptedCompleter {
    rules: Vec<(String, Reply)>,
    default: Reply,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    /// A completer that answers every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default: Reply::Text(reply.into()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A completer whose every call fails as if the service were down.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            default: Reply::Fail(reason.into()),
            ..Self::new("")
        }
    }

    /// Answer `reply` whenever the prompt contains `needle`.
    pub fn on(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// Fail whenever the prompt contains `needle`.
    pub fn fail_on(mut self, needle: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Fail(reason.into())));
        self
    }

    /// Sleep before answering (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str, _timeout: Option<Duration>) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default);

        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(reason) => Err(QuillError::CollaboratorUnavailable(reason.clone())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
