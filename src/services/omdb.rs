//! OMDb API client.

use crate::models::config::OmdbConfig;
use crate::models::media::{
    DetailResult, DetailedMediaItem, MediaItem, SearchFilters, SearchPage, SearchResult,
};
use crate::services::SearchGateway;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Message for any search failure not reported by OMDb itself.
pub const SEARCH_FAILED: &str = "Failed to fetch data from the server";

/// Message for any detail failure not reported by OMDb itself.
pub const DETAILS_FAILED: &str = "Failed to fetch movie details";

/// OMDb API client.
pub struct OmdbClient {
    config: OmdbConfig,
    api_key: String,
    client: reqwest::Client,
}

/// Fields shared by every OMDb response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Search response body.
#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "Search", default)]
    search: Vec<MediaItem>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: OmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(crate::Error::OmdbApiKeyMissing)?;

        Ok(Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        })
    }

    /// Build the search URL for one page.
    pub fn build_search_url(&self, term: &str, page: u32, filters: &SearchFilters) -> String {
        let mut url = format!(
            "{}?apikey={}&s={}&page={}",
            self.config.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(term),
            page
        );
        if let Some(kind) = filters.kind.as_param() {
            url.push_str(&format!("&type={}", kind));
        }
        if let Some(year) = filters.year {
            url.push_str(&format!("&y={}", year));
        }
        url
    }

    /// Build the detail URL for one item, asking for the full plot.
    pub fn build_details_url(&self, imdb_id: &str) -> String {
        format!(
            "{}?apikey={}&i={}&plot=full",
            self.config.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(imdb_id)
        )
    }

    /// Fetch a URL and return the raw body. OMDb reports errors in the body,
    /// even on non-2xx statuses, so the status is not checked here.
    async fn get_body(&self, url: &str) -> Result<String> {
        let body = self.client.get(url).send().await?.text().await?;
        Ok(body)
    }

    /// Verify the API key by looking up a well-known title.
    pub async fn verify_api_key(&self) -> Result<bool> {
        match self.fetch_details_by_id("tt0111161").await {
            DetailResult::Found(_) => Ok(true),
            DetailResult::Failed(message) => {
                tracing::debug!("OMDb key check failed: {}", message);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl SearchGateway for OmdbClient {
    async fn search_by_title(
        &self,
        term: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> SearchResult {
        tracing::debug!(
            "Searching for \"{}\" - page {} - type {} - year {:?}",
            term,
            page,
            filters.kind,
            filters.year
        );

        let url = self.build_search_url(term, page, filters);
        match self.get_body(&url).await {
            Ok(body) => parse_search_body(&body),
            Err(e) => {
                tracing::warn!("OMDb search failed: {}", e);
                SearchResult::Failed(SEARCH_FAILED.to_string())
            }
        }
    }

    async fn fetch_details_by_id(&self, imdb_id: &str) -> DetailResult {
        tracing::debug!("Fetching details for {}", imdb_id);

        let url = self.build_details_url(imdb_id);
        match self.get_body(&url).await {
            Ok(body) => parse_details_body(&body),
            Err(e) => {
                tracing::warn!("OMDb detail lookup failed: {}", e);
                DetailResult::Failed(DETAILS_FAILED.to_string())
            }
        }
    }
}

/// Return the upstream error message if the body reports `Response: "False"`.
fn upstream_error(value: &serde_json::Value, fallback: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_value(value.clone()).ok()?;
    match envelope.response.as_deref() {
        Some(r) if r.eq_ignore_ascii_case("false") => {
            Some(envelope.error.unwrap_or_else(|| fallback.to_string()))
        }
        _ => None,
    }
}

/// Decode a search response body.
pub fn parse_search_body(body: &str) -> SearchResult {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Malformed OMDb search response: {}", e);
            return SearchResult::Failed(SEARCH_FAILED.to_string());
        }
    };

    if let Some(message) = upstream_error(&value, SEARCH_FAILED) {
        return SearchResult::Failed(message);
    }

    match serde_json::from_value::<SearchBody>(value) {
        Ok(body) => SearchResult::Page(SearchPage {
            total_count: body
                .total_results
                .and_then(|t| t.trim().parse().ok())
                .unwrap_or(0),
            items: body.search,
        }),
        Err(e) => {
            tracing::warn!("Unexpected OMDb search payload: {}", e);
            SearchResult::Failed(SEARCH_FAILED.to_string())
        }
    }
}

/// Decode a detail response body.
pub fn parse_details_body(body: &str) -> DetailResult {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Malformed OMDb detail response: {}", e);
            return DetailResult::Failed(DETAILS_FAILED.to_string());
        }
    };

    if let Some(message) = upstream_error(&value, DETAILS_FAILED) {
        return DetailResult::Failed(message);
    }

    match serde_json::from_value::<DetailedMediaItem>(value) {
        Ok(item) => DetailResult::Found(Box::new(item)),
        Err(e) => {
            tracing::warn!("Unexpected OMDb detail payload: {}", e);
            DetailResult::Failed(DETAILS_FAILED.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::{KindFilter, MediaKind};

    fn client() -> OmdbClient {
        OmdbClient::new(OmdbConfig {
            api_key: Some("k3y".to_string()),
            base_url: "http://omdb.test/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let result = OmdbClient::new(OmdbConfig {
            api_key: None,
            ..OmdbConfig::default()
        });
        assert!(matches!(result, Err(crate::Error::OmdbApiKeyMissing)));
    }

    #[test]
    fn test_search_url_omits_all_and_empty_year() {
        let url = client().build_search_url("star wars", 1, &SearchFilters::default());
        assert_eq!(url, "http://omdb.test/?apikey=k3y&s=star%20wars&page=1");
    }

    #[test]
    fn test_search_url_with_filters() {
        let filters = SearchFilters::new(KindFilter::Series, Some(2008));
        let url = client().build_search_url("breaking", 3, &filters);
        assert!(url.ends_with("&s=breaking&page=3&type=series&y=2008"));
    }

    #[test]
    fn test_details_url_requests_full_plot() {
        let url = client().build_details_url("tt0903747");
        assert_eq!(url, "http://omdb.test/?apikey=k3y&i=tt0903747&plot=full");
    }

    #[test]
    fn test_parse_search_page() {
        let body = r#"{
            "Search": [
                {"Title":"Alien","Year":"1979","imdbID":"tt0078748","Type":"movie","Poster":"https://img/alien.jpg"},
                {"Title":"Alien: Isolation","Year":"2014","imdbID":"tt3534580","Type":"game","Poster":"N/A"}
            ],
            "totalResults": "47",
            "Response": "True"
        }"#;

        match parse_search_body(body) {
            SearchResult::Page(page) => {
                assert_eq!(page.total_count, 47);
                assert_eq!(page.total_pages(), 5);
                assert_eq!(page.items.len(), 2);
                assert_eq!(page.items[0].imdb_id, "tt0078748");
                assert_eq!(page.items[0].poster.as_deref(), Some("https://img/alien.jpg"));
                assert_eq!(page.items[1].kind, MediaKind::Game);
                assert_eq!(page.items[1].poster, None);
            }
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_upstream_error_keeps_message() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        assert_eq!(
            parse_search_body(body),
            SearchResult::Failed("Movie not found!".to_string())
        );
    }

    #[test]
    fn test_parse_garbage_uses_fixed_message() {
        assert_eq!(
            parse_search_body("<html>502 Bad Gateway</html>"),
            SearchResult::Failed(SEARCH_FAILED.to_string())
        );
        assert_eq!(
            parse_search_body(r#"{"Search": 5, "Response": "True"}"#),
            SearchResult::Failed(SEARCH_FAILED.to_string())
        );
    }

    #[test]
    fn test_parse_true_without_search_is_empty() {
        match parse_search_body(r#"{"Response":"True"}"#) {
            SearchResult::Page(page) => {
                assert!(page.items.is_empty());
                assert_eq!(page.total_count, 0);
            }
            other => panic!("expected empty page, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_details() {
        let body = r#"{
            "Title":"The Shawshank Redemption","Year":"1994","Rated":"R",
            "Released":"14 Oct 1994","Runtime":"142 min","Genre":"Drama",
            "Director":"Frank Darabont","Writer":"Stephen King, Frank Darabont",
            "Actors":"Tim Robbins, Morgan Freeman","Plot":"Two imprisoned men bond.",
            "Language":"English","Country":"United States","Awards":"Nominated for 7 Oscars",
            "Poster":"N/A","Ratings":[{"Source":"Internet Movie Database","Value":"9.3/10"}],
            "Metascore":"82","imdbRating":"9.3","imdbVotes":"2,900,000",
            "imdbID":"tt0111161","Type":"movie","BoxOffice":"$28,767,189","Response":"True"
        }"#;

        match parse_details_body(body) {
            DetailResult::Found(details) => {
                assert_eq!(details.item.imdb_id, "tt0111161");
                assert_eq!(details.item.poster, None);
                assert_eq!(details.director, "Frank Darabont");
                assert_eq!(details.ratings.len(), 1);
                assert_eq!(details.box_office.as_deref(), Some("$28,767,189"));
                assert_eq!(details.dvd, None);
            }
            DetailResult::Failed(msg) => panic!("unexpected failure: {}", msg),
        }
    }

    #[test]
    fn test_parse_details_error() {
        let body = r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
        assert_eq!(
            parse_details_body(body),
            DetailResult::Failed("Incorrect IMDb ID.".to_string())
        );
        assert_eq!(
            parse_details_body(""),
            DetailResult::Failed(DETAILS_FAILED.to_string())
        );
    }
}
