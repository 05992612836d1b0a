//! Ollama API client.
//!
//! Used as a local alternative to Anthropic for recommendations. Configured
//! through the `[ai]` section or the environment:
//! - `OLLAMA_HOST`: Ollama service URL (default: http://localhost:11434)
//! - `OLLAMA_MODEL`: Model to use (default: qwen2.5:7b)
//! - `OLLAMA_TIMEOUT`: Request timeout in seconds (default: 300)

use crate::models::config::AiConfig;
use crate::services::TextGenerator;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ollama client configuration.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl From<&AiConfig> for OllamaConfig {
    fn from(ai: &AiConfig) -> Self {
        Self {
            base_url: ai.ollama_host.trim_end_matches('/').to_string(),
            model: ai.ollama_model.clone(),
            timeout_secs: ai.ollama_timeout,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

/// Ollama API client.
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

/// Options for generation.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    /// Temperature for sampling (0 = deterministic, 1 = creative)
    temperature: f32,
    /// Random seed for reproducibility
    seed: u32,
}

/// Generate request payload.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

/// Generate response.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub model: String,
    pub done: bool,
}

/// Models list response.
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Model information.
#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
}

impl OllamaClient {
    /// Create a new Ollama client.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Check if Ollama service is available.
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// List available models.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.config.base_url);
        let resp: ModelsResponse = self.client.get(&url).send().await?.json().await?;
        Ok(resp.models)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, system: &str, prompt: &str, prefill: Option<&str>) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);

        // No assistant prefill in /api/generate; ask for it in the prompt instead.
        let prompt = match prefill {
            Some(p) => format!("{}\n\nStart your answer with: {}", prompt, p),
            None => prompt.to_string(),
        };

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system: Some(system.to_string()),
            stream: false,
            // Set temperature=0 and fixed seed for deterministic output
            options: GenerateOptions {
                temperature: 0.0,
                seed: 42,
            },
        };

        let resp: GenerateResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        tracing::debug!("Ollama ({}) replied: {}", resp.model, resp.response);

        let text = resp.response.trim_start();
        let text = match prefill {
            Some(p) => text.strip_prefix(p).unwrap_or(text),
            None => text,
        };
        Ok(text.to_string())
    }
}
