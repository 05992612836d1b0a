//! Anthropic Messages API client.

use crate::models::config::AiConfig;
use crate::services::TextGenerator;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create a client from the `[ai]` config section.
    pub fn from_config(ai: &AiConfig) -> Result<Self> {
        let key = ai
            .anthropic_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::AnthropicApiKeyMissing)?;
        Ok(Self::new(key, ai.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build the message list, ending with the assistant prefill if any.
fn build_messages<'a>(prompt: &'a str, prefill: Option<&'a str>) -> Vec<Message<'a>> {
    let mut messages = vec![Message {
        role: "user",
        content: prompt,
    }];
    if let Some(prefill) = prefill {
        messages.push(Message {
            role: "assistant",
            content: prefill,
        });
    }
    messages
}

/// Join the text blocks of a reply.
fn collect_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text)
        .collect::<Vec<_>>()
        .join("")
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, system: &str, prompt: &str, prefill: Option<&str>) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: build_messages(prompt, prefill),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", API_BASE))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(Error::AiRequestError(format!("{} - {}", status.as_u16(), message)));
        }

        let body: MessagesResponse = response.json().await?;
        let text = collect_text(body);
        tracing::debug!("Anthropic replied: {}", text);
        Ok(text)
    }
}
