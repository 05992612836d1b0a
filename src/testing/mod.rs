//! Test doubles for the external services.
//!
//! ```rust,ignore
//! use media_finder::testing::MockGateway;
//!
//! let gateway = Arc::new(MockGateway::new().with_title("alien", 47).failing_page(3));
//! let aggregator = Aggregator::new(gateway.clone(), 3);
//! // ...
//! assert_eq!(gateway.pages_requested("alien").len(), 5);
//! ```

use crate::models::media::{
    DetailResult, DetailedMediaItem, MediaItem, MediaKind, SearchFilters, SearchPage, SearchResult,
    PAGE_SIZE,
};
use crate::services::{SearchGateway, TextGenerator};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// Message OMDb returns for unknown titles.
pub const NOT_FOUND: &str = "Movie not found!";

/// A recorded search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub term: String,
    pub page: u32,
    pub filters: SearchFilters,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory search gateway.
///
/// Each registered title has a synthetic result set that is paged by
/// `PAGE_SIZE`. Unknown titles fail the way OMDb does.
#[derive(Default)]
pub struct MockGateway {
    /// term -> total result count
    titles: Mutex<HashMap<String, u32>>,
    details: Mutex<HashMap<String, DetailedMediaItem>>,
    failing_pages: Mutex<HashSet<u32>>,
    panicking_pages: Mutex<HashSet<u32>>,
    /// If set, requests for pages > 1 wait for a permit.
    fan_out_gate: Mutex<Option<Arc<Semaphore>>>,
    /// If set, page 1 of that term waits for a permit.
    first_page_gate: Mutex<Option<(String, Arc<Semaphore>)>>,
    calls: Mutex<Vec<RecordedSearch>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `term` with `total` results.
    pub fn with_title(self, term: &str, total: u32) -> Self {
        lock(&self.titles).insert(term.to_string(), total);
        self
    }

    /// Register a detail record.
    pub fn with_details(self, details: DetailedMediaItem) -> Self {
        lock(&self.details).insert(details.item.imdb_id.clone(), details);
        self
    }

    /// Make `page` answer with a failure for every term.
    pub fn failing_page(self, page: u32) -> Self {
        lock(&self.failing_pages).insert(page);
        self
    }

    /// Make `page` panic, which surfaces as a failed task.
    pub fn panicking_page(self, page: u32) -> Self {
        lock(&self.panicking_pages).insert(page);
        self
    }

    pub fn clear_panicking_pages(&self) {
        lock(&self.panicking_pages).clear();
    }

    /// Hold every request for pages > 1 until permits are added to the
    /// returned semaphore.
    pub fn hold_fan_out(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.fan_out_gate) = Some(gate.clone());
        gate
    }

    /// Hold the page-1 request of `term` until a permit is added to the
    /// returned semaphore.
    pub fn hold_first_page(&self, term: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.first_page_gate) = Some((term.to_string(), gate.clone()));
        gate
    }

    pub fn calls(&self) -> Vec<RecordedSearch> {
        lock(&self.calls).clone()
    }

    /// Pages requested for `term`, in call order.
    pub fn pages_requested(&self, term: &str) -> Vec<u32> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.term == term)
            .map(|c| c.page)
            .collect()
    }

    /// IMDb ID of the `n`-th (1-based) synthetic result of `term`.
    pub fn item_id(term: &str, n: u32) -> String {
        format!("{}-{}", term, n)
    }

    /// The `n`-th (1-based) synthetic result of `term`.
    pub fn item(term: &str, n: u32) -> MediaItem {
        MediaItem {
            imdb_id: Self::item_id(term, n),
            title: format!("{} {}", term, n),
            year: (1980 + n % 40).to_string(),
            kind: MediaKind::Movie,
            poster: None,
        }
    }

    fn page_for(&self, term: &str, page: u32) -> SearchResult {
        let total = match lock(&self.titles).get(term) {
            Some(total) => *total,
            None => return SearchResult::Failed(NOT_FOUND.to_string()),
        };
        if lock(&self.failing_pages).contains(&page) {
            return SearchResult::Failed(format!("page {} unavailable", page));
        }

        let first = (page - 1) * PAGE_SIZE + 1;
        let last = (page * PAGE_SIZE).min(total);
        SearchResult::Page(SearchPage {
            items: (first..=last).map(|n| Self::item(term, n)).collect(),
            total_count: total,
        })
    }
}

#[async_trait]
impl SearchGateway for MockGateway {
    async fn search_by_title(
        &self,
        term: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> SearchResult {
        lock(&self.calls).push(RecordedSearch {
            term: term.to_string(),
            page,
            filters: filters.clone(),
        });

        let gate = if page > 1 {
            lock(&self.fan_out_gate).clone()
        } else {
            lock(&self.first_page_gate)
                .as_ref()
                .filter(|(held, _)| held == term)
                .map(|(_, gate)| gate.clone())
        };
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let panics = lock(&self.panicking_pages).contains(&page);
        if panics {
            panic!("mock gateway: page {} exploded", page);
        }

        self.page_for(term, page)
    }

    async fn fetch_details_by_id(&self, imdb_id: &str) -> DetailResult {
        match lock(&self.details).get(imdb_id) {
            Some(details) => DetailResult::Found(Box::new(details.clone())),
            None => DetailResult::Failed("Incorrect IMDb ID.".to_string()),
        }
    }
}

/// Canned text generator.
pub struct MockGenerator {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _system: &str,
        prompt: &str,
        _prefill: Option<&str>,
    ) -> crate::Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        self.reply
            .clone()
            .map_err(crate::Error::AiRequestError)
    }
}

/// A minimal detail record for `item`.
pub fn details_for(item: MediaItem, plot: &str) -> DetailedMediaItem {
    DetailedMediaItem {
        item,
        rated: "PG-13".to_string(),
        released: String::new(),
        runtime: "120 min".to_string(),
        genre: "Drama".to_string(),
        director: "Jane Doe".to_string(),
        writer: String::new(),
        actors: String::new(),
        plot: plot.to_string(),
        language: "English".to_string(),
        country: String::new(),
        awards: String::new(),
        ratings: Vec::new(),
        metascore: "N/A".to_string(),
        imdb_rating: "7.5".to_string(),
        imdb_votes: "1,000".to_string(),
        dvd: None,
        box_office: None,
        production: None,
        website: None,
    }
}
