//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OMDb configuration.
    pub omdb: OmdbConfig,
    /// Recommendation backend configuration.
    pub ai: AiConfig,
    /// Interactive search tuning.
    pub search: SearchConfig,
    /// Liked-list session scope.
    pub session: SessionConfig,
}

/// OMDb configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Base URL of the API.
    pub base_url: String,
}

/// Which generative backend answers recommendation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Anthropic,
    Ollama,
}

impl std::str::FromStr for AiProvider {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(AiProvider::Anthropic),
            "ollama" => Ok(AiProvider::Ollama),
            other => Err(crate::Error::UnknownAiProvider(other.to_string())),
        }
    }
}

/// Recommendation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// Anthropic API key.
    pub anthropic_api_key: Option<String>,
    /// Anthropic model.
    pub model: String,
    /// Ollama service URL.
    pub ollama_host: String,
    /// Ollama model.
    pub ollama_model: String,
    /// Ollama request timeout in seconds.
    pub ollama_timeout: u64,
}

/// Interactive search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Debounce delay in milliseconds.
    pub debounce_ms: u64,
    /// Minimum term length before a search is committed.
    pub min_length: usize,
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session id used to scope the liked list.
    pub id: String,
    /// Root directory holding per-session storage.
    pub dir: PathBuf,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://www.omdbapi.com/".to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Anthropic,
            anthropic_api_key: None,
            model: "claude-3-haiku-20240307".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            ollama_model: "qwen2.5:7b".to_string(),
            ollama_timeout: 300,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_length: 3,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("media_finder")
                .join("sessions"),
        }
    }
}

impl Config {
    /// Apply environment variable overrides on top of file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OMDB_API_KEY") {
            self.omdb.api_key = Some(key);
        }
        if let Some(url) = get("OMDB_BASE_URL") {
            self.omdb.base_url = url;
        }
        if let Some(provider) = get("MEDIA_FINDER_AI_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.ai.provider = p,
                Err(e) => tracing::warn!("Ignoring MEDIA_FINDER_AI_PROVIDER: {}", e),
            }
        }
        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(model) = get("MEDIA_FINDER_AI_MODEL") {
            self.ai.model = model;
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.ai.ollama_host = host;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.ai.ollama_model = model;
        }
        if let Some(timeout) = get("OLLAMA_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.ai.ollama_timeout = timeout;
        }
        if let Some(session) = get("MEDIA_FINDER_SESSION") {
            self.session.id = session;
        }
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_finder")
}

/// Load configuration from file, then apply environment overrides.
pub fn load_config() -> Config {
    let mut config = read_config_file(&config_dir().join("config.toml"));
    config.apply_env();
    config
}

/// Read a config file, falling back to defaults if it is missing or invalid.
pub fn read_config_file(path: &std::path::Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Invalid config file {}: {}", path.display(), e);
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!("Cannot read config file {}: {}", path.display(), e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.min_length, 3);
        assert_eq!(config.omdb.base_url, "http://www.omdbapi.com/");
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert_eq!(config.session.id, "default");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [omdb]
            api_key = "abc123"

            [search]
            debounce_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.omdb.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.omdb.base_url, "http://www.omdbapi.com/");
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.search.min_length, 3);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("OMDB_API_KEY", "k"),
            ("MEDIA_FINDER_AI_PROVIDER", "ollama"),
            ("OLLAMA_TIMEOUT", "30"),
            ("MEDIA_FINDER_SESSION", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.omdb.api_key.as_deref(), Some("k"));
        assert_eq!(config.ai.provider, AiProvider::Ollama);
        assert_eq!(config.ai.ollama_timeout, 30);
        assert_eq!(config.session.id, "default");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let config = read_config_file(&path);
        assert_eq!(config.search.min_length, 3);
    }
}
