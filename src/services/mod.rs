//! External service clients.

pub mod anthropic;
pub mod ollama;
pub mod omdb;

use crate::models::media::{DetailResult, SearchFilters, SearchResult};
use async_trait::async_trait;

/// Access to the title search API.
///
/// Implementations never fail: transport and upstream errors come back as
/// the `Failed` variants.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Search by title. `page` is 1-based.
    async fn search_by_title(&self, term: &str, page: u32, filters: &SearchFilters) -> SearchResult;

    /// Fetch the full record of a single item.
    async fn fetch_details_by_id(&self, imdb_id: &str) -> DetailResult;
}

/// A text completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name (e.g., "anthropic", "ollama")
    fn provider(&self) -> &str;

    /// Complete `prompt` under the `system` instruction.
    ///
    /// `prefill` starts the assistant reply where the backend supports it; the
    /// returned text never includes the prefill.
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        prefill: Option<&str>,
    ) -> crate::Result<String>;
}
