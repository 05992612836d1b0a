//! Recommendation backend preflight check.

use super::CheckResult;
use crate::models::config::{AiConfig, AiProvider};
use crate::services::ollama::{OllamaClient, OllamaConfig};

/// Check that the configured AI backend can be used.
pub async fn check(config: &AiConfig) -> CheckResult {
    match config.provider {
        AiProvider::Anthropic => check_anthropic(config),
        AiProvider::Ollama => check_ollama(config).await,
    }
}

fn check_anthropic(config: &AiConfig) -> CheckResult {
    match config.anthropic_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            CheckResult::ok("Anthropic", &format!("configured (model: {})", config.model))
        }
        _ => CheckResult::fail(
            "Anthropic",
            "API key not configured",
            "Set ANTHROPIC_API_KEY, or MEDIA_FINDER_AI_PROVIDER=ollama",
        ),
    }
}

async fn check_ollama(config: &AiConfig) -> CheckResult {
    let client = match OllamaClient::new(OllamaConfig::from(config)) {
        Ok(client) => client,
        Err(e) => {
            return CheckResult::fail("Ollama", &e.to_string(), "Check OLLAMA_HOST");
        }
    };

    match client.health_check().await {
        Ok(true) => {
            // Try to get model list
            match client.list_models().await {
                Ok(models) => {
                    let model_names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
                    if models.is_empty() {
                        CheckResult::fail(
                            "Ollama",
                            "running but no models",
                            &format!("Pull a model: ollama pull {}", client.model()),
                        )
                    } else {
                        CheckResult::ok(
                            "Ollama",
                            &format!("running (models: {})", model_names.join(", ")),
                        )
                    }
                }
                Err(_) => CheckResult::ok("Ollama", "running"),
            }
        }
        Ok(false) | Err(_) => CheckResult::fail(
            "Ollama",
            "not running",
            "Start Ollama: ollama serve",
        ),
    }
}
