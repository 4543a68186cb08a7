//! Chat-completion client.
//!
//! The crew only needs "messages in, text out", so the seam is the small
//! [`LlmClient`] trait. [`OpenAiClient`] implements it against any
//! OpenAI-compatible `/chat/completions` endpoint with a blocking HTTP client.

use std::time::{Duration, Instant};

use competitor_report_core::LlmSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CrewError, Result};

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// `system`, `user` or `assistant`.
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One completion request. Unset sampling fields fall back to the client's
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that can complete a chat conversation.
pub trait LlmClient {
    /// Returns the assistant's reply text.
    fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Builds a config from file/env settings and an API key.
    pub fn from_settings(settings: &LlmSettings, api_key: impl Into<String>) -> Self {
        Self {
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            api_key: api_key.into(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from_settings(&LlmSettings::default(), "")
    }
}

/// Request body sent over the wire.
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for OpenAI-compatible chat completions.
pub struct OpenAiClient {
    http_client: reqwest::blocking::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`CrewError::Config`] when the API key is blank or the HTTP
    /// client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CrewError::Config("API key is not set".to_string()));
        }
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CrewError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();
        let body = WireRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                CrewError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(CrewError::Api(format!("{status}: {error_text}")));
        }

        let raw: ChatResponseRaw = response
            .json()
            .map_err(|e| CrewError::Parse(e.to_string()))?;
        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CrewError::Api("response contained no choices".to_string()))?;

        debug!(
            model = %self.config.model,
            duration_ms = start.elapsed().as_millis(),
            chars = content.chars().count(),
            "Chat completion"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_and_serialization() {
        let request = ChatRequest::new()
            .message(Message::system("be brief"))
            .message(Message::user("hello"))
            .temperature(0.5);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["temperature"], 0.5);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_wire_request_uses_config_defaults() {
        let config = LlmConfig::default();
        let messages = vec![Message::user("hi")];
        let body = WireRequest {
            model: &config.model,
            messages: &messages,
            temperature: None.unwrap_or(config.temperature),
            max_tokens: None.unwrap_or(config.max_tokens),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_parse_response_tolerates_null_content() {
        let raw: ChatResponseRaw =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(raw.choices[0].message.content.is_none());
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let err = OpenAiClient::new(LlmConfig::default()).err().unwrap();
        assert!(matches!(err, CrewError::Config(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost:11434/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout: Duration::from_secs(2),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(config).unwrap();
        let err = client
            .complete(&ChatRequest::new().message(Message::user("hi")))
            .unwrap_err();
        assert!(matches!(err, CrewError::Network(_)), "{err}");
    }
}
