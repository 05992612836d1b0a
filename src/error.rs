//! Error types for the media finder.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media finder.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("OMDb API key not configured. Set OMDB_API_KEY environment variable")]
    OmdbApiKeyMissing,

    #[error("Anthropic API key not configured. Set ANTHROPIC_API_KEY environment variable")]
    AnthropicApiKeyMissing,

    #[error("Unknown AI provider: {0} (expected anthropic or ollama)")]
    UnknownAiProvider(String),

    // Input errors
    #[error("Enter {0} more character(s) to search")]
    TermTooShort(usize),

    #[error("Invalid media type filter: {0} (expected all, movie, series, episode or game)")]
    InvalidKind(String),

    #[error("Invalid year filter: {0}")]
    InvalidYear(String),

    #[error("Please enter a description")]
    EmptyDescription,

    // AI errors
    #[error("No recommendations found. Please try a different description.")]
    NoRecommendations,

    #[error("AI request failed: {0}")]
    AiRequestError(String),

    // OMDb errors
    #[error("OMDb lookup failed: {0}")]
    OmdbLookupError(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
