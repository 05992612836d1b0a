//! AI recommendations.
//!
//! A free-text description goes to a text generator that answers with a list
//! of five titles; each title is then looked up on OMDb, one at a time, and
//! the first hit is kept.

use crate::models::media::{MediaItem, SearchFilters, SearchResult};
use crate::services::{SearchGateway, TextGenerator};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Number of titles asked from the model.
pub const RECOMMENDATION_COUNT: usize = 5;

/// Instruction sent with every description.
pub const SYSTEM_PROMPT: &str = "You are an entertainment media expert. You are given a short \
description of a movie, TV show or game and you need to return a list of 5 recommendations \
based on the description. Only return the list, nothing else. Something like this: \
['title1', 'title2', 'title3', 'title4', 'title5']";

/// The assistant reply is started with this so the model continues a list.
const PREFILL: &str = "[";

/// A suggested title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    /// Stable temporary id derived from the title.
    pub id: String,
}

impl Recommendation {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let id = temp_id(&title);
        Self { title, id }
    }
}

/// `rec_` followed by the first 8 hex digits of the title's SHA-256.
fn temp_id(title: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(title.as_bytes()));
    format!("rec_{}", &digest[..8])
}

/// Drop a surrounding markdown code fence.
fn strip_code_fence(text: &str) -> String {
    match regex::Regex::new(r"^```[A-Za-z]*\s*|\s*```$") {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Parse a model reply into titles.
///
/// Accepts a JSON list, a list missing its opening bracket (when the bracket
/// was prefilled), or a Python-style list with single quotes. Anything else
/// yields an empty list. Model output varies, so this is best-effort.
pub fn parse_recommendations(reply: &str) -> Vec<Recommendation> {
    let stripped = strip_code_fence(reply.trim());
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let list = if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{}", trimmed)
    };

    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&list) {
        Ok(values) => values,
        Err(_) => {
            let mut cleaned = list.replace('\'', "\"");
            if !cleaned.ends_with(']') {
                cleaned.push(']');
            }
            match serde_json::from_str::<Vec<serde_json::Value>>(&cleaned) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Failed to parse recommendations: {} ({})", e, reply);
                    return Vec::new();
                }
            }
        }
    };

    values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(RECOMMENDATION_COUNT)
        .map(Recommendation::new)
        .collect()
}

/// Lookup progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatus {
    pub total: usize,
    pub found: usize,
    pub skipped: usize,
}

/// Result of resolving recommendations against OMDb.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    pub items: Vec<MediaItem>,
    pub status: SearchStatus,
}

/// Recommendation flow.
pub struct Recommender {
    generator: Arc<dyn TextGenerator>,
    gateway: Arc<dyn SearchGateway>,
}

impl Recommender {
    pub fn new(generator: Arc<dyn TextGenerator>, gateway: Arc<dyn SearchGateway>) -> Self {
        Self { generator, gateway }
    }

    /// Ask the generator for titles matching `description`.
    pub async fn recommend(&self, description: &str) -> Result<Vec<Recommendation>> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        let recommendations = match self
            .generator
            .generate(SYSTEM_PROMPT, description, Some(PREFILL))
            .await
        {
            Ok(reply) => parse_recommendations(&reply),
            Err(e) => {
                tracing::error!(
                    "Error getting recommendations from {}: {}",
                    self.generator.provider(),
                    e
                );
                Vec::new()
            }
        };

        if recommendations.is_empty() {
            return Err(Error::NoRecommendations);
        }
        Ok(recommendations)
    }

    /// Look up each recommendation in turn, keeping the first match.
    /// `on_progress` is called after every lookup.
    pub async fn resolve<F>(
        &self,
        recommendations: &[Recommendation],
        mut on_progress: F,
    ) -> RecommendationReport
    where
        F: FnMut(&Recommendation, &SearchStatus),
    {
        let mut report = RecommendationReport {
            recommendations: recommendations.to_vec(),
            items: Vec::new(),
            status: SearchStatus {
                total: recommendations.len(),
                ..SearchStatus::default()
            },
        };
        let filters = SearchFilters::default();

        for rec in recommendations {
            match self.gateway.search_by_title(&rec.title, 1, &filters).await {
                SearchResult::Page(page) if !page.items.is_empty() => {
                    report.items.extend(page.items.into_iter().take(1));
                    report.status.found += 1;
                }
                SearchResult::Page(_) => {
                    tracing::info!("No results found for: {}", rec.title);
                    report.status.skipped += 1;
                }
                SearchResult::Failed(message) => {
                    tracing::info!("No match for \"{}\": {}", rec.title, message);
                    report.status.skipped += 1;
                }
            }
            on_progress(rec, &report.status);
        }

        report
    }

    /// Recommend, then resolve.
    pub async fn run<F>(&self, description: &str, on_progress: F) -> Result<RecommendationReport>
    where
        F: FnMut(&Recommendation, &SearchStatus),
    {
        let recommendations = self.recommend(description).await?;
        Ok(self.resolve(&recommendations, on_progress).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGateway, MockGenerator};

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_parse_json_list() {
        let recs = parse_recommendations(r#"["Alien", "Aliens", "Prometheus"]"#);
        assert_eq!(titles(&recs), vec!["Alien", "Aliens", "Prometheus"]);
    }

    #[test]
    fn test_parse_prefilled_reply() {
        let recs = parse_recommendations(r#""Heat", "Ronin"]"#);
        assert_eq!(titles(&recs), vec!["Heat", "Ronin"]);
    }

    #[test]
    fn test_parse_single_quotes() {
        let recs = parse_recommendations("'Heat', 'Ronin', 'Collateral']");
        assert_eq!(titles(&recs), vec!["Heat", "Ronin", "Collateral"]);
    }

    #[test]
    fn test_parse_code_fence_and_non_strings() {
        let recs = parse_recommendations("```json\n[\" 1917 \", 2012, \"\"]\n```");
        assert_eq!(titles(&recs), vec!["1917", "2012"]);
    }

    #[test]
    fn test_parse_caps_at_five() {
        let recs = parse_recommendations(r#"["a","b","c","d","e","f"]"#);
        assert_eq!(recs.len(), RECOMMENDATION_COUNT);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_recommendations("I cannot help with that.").is_empty());
        assert!(parse_recommendations("").is_empty());
    }

    #[test]
    fn test_temp_id_is_stable() {
        let a = Recommendation::new("Alien");
        let b = Recommendation::new("Alien");
        assert_eq!(a.id, b.id);
        assert!(a.id.starts_with("rec_"));
        assert_eq!(a.id.len(), 12);
        assert_ne!(a.id, Recommendation::new("Aliens").id);
    }

    #[tokio::test]
    async fn test_resolve_counts_found_and_skipped() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_title("Alpha", 3)
                .with_title("Gamma", 1),
        );
        let generator = Arc::new(MockGenerator::replying(r#""Alpha","Beta","Gamma"]"#));
        let recommender = Recommender::new(generator.clone(), gateway.clone());

        let mut seen = Vec::new();
        let report = recommender
            .run("space horror", |rec, status| seen.push((rec.title.clone(), *status)))
            .await
            .unwrap();

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].imdb_id, MockGateway::item_id("Alpha", 1));
        assert_eq!(report.items[1].imdb_id, MockGateway::item_id("Gamma", 1));
        assert_eq!(
            report.status,
            SearchStatus {
                total: 3,
                found: 2,
                skipped: 1
            }
        );
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].1.skipped, 1);

        // Sequential, page 1 only.
        let calls = gateway.calls();
        let order: Vec<_> = calls.iter().map(|c| (c.term.as_str(), c.page)).collect();
        assert_eq!(order, vec![("Alpha", 1), ("Beta", 1), ("Gamma", 1)]);

        let prompts = generator.prompts();
        assert_eq!(prompts, vec!["space horror".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_description_is_rejected() {
        let recommender = Recommender::new(
            Arc::new(MockGenerator::replying("[]")),
            Arc::new(MockGateway::new()),
        );
        assert!(matches!(
            recommender.recommend("   ").await,
            Err(Error::EmptyDescription)
        ));
    }

    #[tokio::test]
    async fn test_generator_failure_means_no_recommendations() {
        let recommender = Recommender::new(
            Arc::new(MockGenerator::failing("overloaded")),
            Arc::new(MockGateway::new()),
        );
        assert!(matches!(
            recommender.recommend("heist movies").await,
            Err(Error::NoRecommendations)
        ));
    }
}
