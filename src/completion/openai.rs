// OpenAI-compatible chat-completions provider.
//
// Works against any endpoint that speaks the `/chat/completions` shape
// (OpenAI, Groq, OpenRouter, a local llama.cpp server). The prompt is sent
// as a single user message and the first choice's content comes back as-is.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::TextCompleter;
use crate::error::{QuillError, Result};

/// Default API base when LLM_BASE_URL isn't set.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when LLM_MODEL isn't set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature when LLM_TEMPERATURE isn't set.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct OpenAiCompleter {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompleter {
    pub fn new(base_url: &str, api_key: String, model: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("quill/0.1 (post-drafting)")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl TextCompleter for OpenAiCompleter {
    async fn complete(&self, prompt: &str, timeout: Option<Duration>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                format!("network error: {e}")
            };
            QuillError::CollaboratorUnavailable(reason)
        })?;

        // 401/403 (bad key), 429 (rate limit) and 5xx all mean the same thing
        // to the pipeline: the service can't give us text right now.
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::CollaboratorUnavailable(format!(
                "{} returned {status}: {body}",
                self.base_url
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            QuillError::CollaboratorUnavailable(format!("malformed completion response: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            reply_chars = content.chars().count(),
            "Completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// --- Chat completions request/response types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_as_single_user_message() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "write",
            }],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "write");
        assert_eq!(json["model"], "m");
    }

    #[test]
    fn response_without_choices_deserializes() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = OpenAiCompleter::new("http://localhost:8080/v1/", "k".into(), "m".into()).unwrap();
        assert_eq!(c.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn temperature_is_sent_with_the_request() {
        let c = OpenAiCompleter::new("http://localhost:8080/v1", "k".into(), "m".into())
            .unwrap()
            .with_temperature(0.2);
        assert_eq!(c.temperature, 0.2);
    }

    #[tokio::test]
    async fn unreachable_host_is_collaborator_unavailable() {
        // Port 9 (discard) on localhost is almost never listening.
        let c = OpenAiCompleter::new("http://127.0.0.1:9", "k".into(), "m".into()).unwrap();
        let err = c
            .complete("hi", Some(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::CollaboratorUnavailable(_)));
    }
}
