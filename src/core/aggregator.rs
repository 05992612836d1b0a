//! Result aggregation.
//!
//! Every distinct (term, filters) pair starts a new epoch. Page 1 is always
//! fetched for the current epoch; when the caller asks for everything, pages
//! 2..=N are requested concurrently and appended in page order. Responses that
//! arrive after the epoch moved on are dropped.

use super::query::Commitment;
use crate::models::media::{total_pages, MediaItem, SearchFilters, SearchResult};
use crate::services::SearchGateway;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shown when the fan-out itself breaks down.
pub const LOAD_ALL_FAILED: &str = "Failed to load all pages. Please try again.";

/// Status of the page-1 request of the current epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FirstPage {
    /// No valid term committed.
    #[default]
    Idle,
    /// Committed, request not issued yet.
    Pending,
    /// Request in flight.
    Loading,
    Failed(String),
    Empty,
    Loaded,
}

/// Aggregation state of one epoch.
#[derive(Debug, Clone, Default)]
pub struct AggregationState {
    pub epoch: u64,
    pub requested_term: String,
    pub requested_filters: SearchFilters,
    pub first_page: FirstPage,
    pub merged_items: Vec<MediaItem>,
    pub total_count: u32,
    pub total_pages: u32,
    pub fetch_all_requested: bool,
    pub is_fetching_all: bool,
    /// Every page has been merged.
    pub all_shown: bool,
    /// Auto-fetching stopped after a fan-out failure.
    pub halted: bool,
    pub last_error: Option<String>,
}

impl AggregationState {
    fn is_current(&self, epoch: u64, term: &str, filters: &SearchFilters) -> bool {
        self.epoch == epoch && self.requested_term == term && self.requested_filters == *filters
    }

    fn should_fan_out(&self) -> bool {
        self.fetch_all_requested
            && self.first_page == FirstPage::Loaded
            && self.total_pages > 1
            && !self.is_fetching_all
            && !self.all_shown
            && !self.halted
    }
}

/// Snapshot of what should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// No term long enough to search.
    Hidden,
    Loading,
    Error(String),
    NoResults { term: String },
    Results(ResultsPage),
}

/// Displayable results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPage {
    pub term: String,
    pub filters: SearchFilters,
    pub items: Vec<MediaItem>,
    pub total_count: u32,
    pub total_pages: u32,
    pub fetching_all: bool,
    pub all_shown: bool,
    /// More pages exist and full aggregation was not requested.
    pub can_load_all: bool,
}

impl ResultsPage {
    /// Heading such as `47 results for "alien" (Type: movie)`.
    pub fn describe(&self) -> String {
        let mut description = format!("{} results for \"{}\"", self.total_count, self.term);
        if let Some(kind) = self.filters.kind.as_param() {
            description.push_str(&format!(" (Type: {})", kind));
        }
        if let Some(year) = self.filters.year {
            description.push_str(&format!(" (Year: {})", year));
        }
        description
    }
}

/// Drives searches for a sequence of commitments.
pub struct Aggregator {
    gateway: Arc<dyn SearchGateway>,
    min_length: usize,
    state: Mutex<AggregationState>,
}

impl Aggregator {
    pub fn new(gateway: Arc<dyn SearchGateway>, min_length: usize) -> Self {
        Self {
            gateway,
            min_length,
            state: Mutex::new(AggregationState::default()),
        }
    }

    /// Record a commitment. A changed (term, filters) pair clears everything
    /// and starts a new epoch before any new data can be applied.
    pub async fn commit(&self, term: &str, filters: &SearchFilters, fetch_all: bool) {
        let mut state = self.state.lock().await;

        if term.chars().count() < self.min_length {
            if state.first_page != FirstPage::Idle {
                tracing::debug!("Search cleared");
                *state = AggregationState {
                    epoch: state.epoch + 1,
                    ..AggregationState::default()
                };
            }
            return;
        }

        if state.requested_term != term
            || state.requested_filters != *filters
            || state.first_page == FirstPage::Idle
        {
            let epoch = state.epoch + 1;
            tracing::debug!("New search epoch {}: \"{}\" {:?}", epoch, term, filters);
            *state = AggregationState {
                epoch,
                requested_term: term.to_string(),
                requested_filters: filters.clone(),
                first_page: FirstPage::Pending,
                ..AggregationState::default()
            };
        }
        state.fetch_all_requested = fetch_all;
    }

    /// Commit and run the fetch pipeline.
    pub async fn update(&self, commitment: &Commitment) {
        self.commit(&commitment.term, &commitment.filters, commitment.fetch_all)
            .await;
        self.refresh().await;
    }

    /// Fetch page 1 if the current epoch still needs it, then fetch the
    /// remaining pages if they were requested.
    pub async fn refresh(&self) {
        let pending = {
            let mut state = self.state.lock().await;
            if state.first_page == FirstPage::Pending {
                state.first_page = FirstPage::Loading;
                Some((
                    state.epoch,
                    state.requested_term.clone(),
                    state.requested_filters.clone(),
                ))
            } else {
                None
            }
        };

        if let Some((epoch, term, filters)) = pending {
            let result = self.gateway.search_by_title(&term, 1, &filters).await;

            let mut state = self.state.lock().await;
            if !state.is_current(epoch, &term, &filters) {
                tracing::debug!("Discarding stale page 1 for \"{}\"", term);
                return;
            }

            match result {
                SearchResult::Failed(message) => {
                    state.first_page = FirstPage::Failed(message);
                }
                SearchResult::Page(page) => {
                    state.total_count = page.total_count;
                    state.total_pages = page.total_pages();
                    if page.items.is_empty() {
                        state.first_page = FirstPage::Empty;
                    } else {
                        state.merged_items = page.items;
                        state.first_page = FirstPage::Loaded;
                    }
                }
            }
        }

        self.fetch_remaining().await;
    }

    /// Ask for full aggregation of the current epoch.
    pub async fn request_all(&self) {
        {
            let mut state = self.state.lock().await;
            if state.first_page == FirstPage::Idle {
                return;
            }
            state.fetch_all_requested = true;
        }
        self.refresh().await;
    }

    async fn fetch_remaining(&self) {
        let (epoch, term, filters, pages, first_items) = {
            let mut state = self.state.lock().await;
            if !state.should_fan_out() {
                return;
            }
            state.is_fetching_all = true;
            state.last_error = None;
            (
                state.epoch,
                state.requested_term.clone(),
                state.requested_filters.clone(),
                state.total_pages,
                state.merged_items.clone(),
            )
        };

        tracing::info!("Loading pages 2..={} for \"{}\"", pages, term);

        // Spawn every request before awaiting any of them.
        let handles: Vec<_> = (2..=pages)
            .map(|page| {
                let gateway = Arc::clone(&self.gateway);
                let term = term.clone();
                let filters = filters.clone();
                tokio::spawn(async move { gateway.search_by_title(&term, page, &filters).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        let mut state = self.state.lock().await;
        if !state.is_current(epoch, &term, &filters) {
            tracing::debug!("Discarding stale pages for \"{}\"", term);
            return;
        }
        state.is_fetching_all = false;

        let mut merged = first_items;
        for (page, joined) in (2u32..).zip(results) {
            match joined {
                Ok(SearchResult::Page(result)) => merged.extend(result.items),
                Ok(SearchResult::Failed(message)) => {
                    tracing::warn!("Skipping page {} of \"{}\": {}", page, term, message);
                }
                Err(e) => {
                    tracing::error!("Error fetching all pages: {}", e);
                    state.last_error = Some(LOAD_ALL_FAILED.to_string());
                    state.halted = true;
                    return;
                }
            }
        }

        tracing::debug!("Merged {} items for \"{}\"", merged.len(), term);
        state.merged_items = merged;
        state.all_shown = true;
    }

    /// Copy of the current state.
    pub async fn state(&self) -> AggregationState {
        self.state.lock().await.clone()
    }

    /// What should be displayed right now.
    pub async fn view(&self) -> ResultsView {
        let state = self.state.lock().await;
        match &state.first_page {
            FirstPage::Idle => ResultsView::Hidden,
            FirstPage::Pending | FirstPage::Loading => ResultsView::Loading,
            FirstPage::Failed(message) => ResultsView::Error(message.clone()),
            FirstPage::Empty => ResultsView::NoResults {
                term: state.requested_term.clone(),
            },
            FirstPage::Loaded => match &state.last_error {
                Some(message) => ResultsView::Error(message.clone()),
                None => ResultsView::Results(ResultsPage {
                    term: state.requested_term.clone(),
                    filters: state.requested_filters.clone(),
                    items: state.merged_items.clone(),
                    total_count: state.total_count,
                    total_pages: total_pages(state.total_count),
                    fetching_all: state.is_fetching_all,
                    all_shown: state.all_shown,
                    can_load_all: !state.fetch_all_requested && state.total_pages > 1,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::KindFilter;
    use crate::testing::MockGateway;

    fn aggregator(gateway: &Arc<MockGateway>) -> Aggregator {
        Aggregator::new(gateway.clone(), 3)
    }

    #[tokio::test]
    async fn test_short_term_issues_no_request() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 47));
        let agg = aggregator(&gateway);

        agg.commit("al", &SearchFilters::default(), true).await;
        agg.refresh().await;

        assert_eq!(agg.view().await, ResultsView::Hidden);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_page_only_by_default() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 47));
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), false).await;
        assert_eq!(agg.view().await, ResultsView::Loading);
        agg.refresh().await;

        match agg.view().await {
            ResultsView::Results(page) => {
                assert_eq!(page.items.len(), 10);
                assert_eq!(page.total_pages, 5);
                assert!(page.can_load_all);
                assert!(!page.all_shown);
                assert_eq!(page.describe(), "47 results for \"alien\"");
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(gateway.pages_requested("alien"), vec![1]);
    }

    #[tokio::test]
    async fn test_fan_out_requests_remaining_pages() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 47));
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), true).await;
        agg.refresh().await;

        let mut pages = gateway.pages_requested("alien");
        pages.sort();
        assert_eq!(pages, vec![1, 2, 3, 4, 5]);

        let state = agg.state().await;
        assert_eq!(state.merged_items.len(), 47);
        assert!(state.all_shown);
        assert!(!state.is_fetching_all);
        let ids: Vec<_> = state.merged_items.iter().map(|i| i.imdb_id.clone()).collect();
        let expected: Vec<_> = (1..=47).map(|n| MockGateway::item_id("alien", n)).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_failed_page_is_omitted() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 47).failing_page(3));
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), true).await;
        agg.refresh().await;

        let state = agg.state().await;
        assert_eq!(state.last_error, None);
        assert!(state.all_shown);
        let ids: Vec<_> = state.merged_items.iter().map(|i| i.imdb_id.clone()).collect();
        let expected: Vec<_> = (1..=20)
            .chain(31..=47)
            .map(|n| MockGateway::item_id("alien", n))
            .collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_request_all_runs_once() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 25));
        let agg = aggregator(&gateway);

        agg.update(&Commitment {
            term: "alien".to_string(),
            filters: SearchFilters::default(),
            fetch_all: false,
        })
        .await;
        agg.request_all().await;
        agg.request_all().await;

        assert_eq!(gateway.calls().len(), 3);
        match agg.view().await {
            ResultsView::Results(page) => {
                assert_eq!(page.items.len(), 25);
                assert!(!page.can_load_all);
                assert!(page.all_shown);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_and_empty() {
        let gateway = Arc::new(MockGateway::new().with_title("nothing", 0));
        let agg = aggregator(&gateway);

        agg.commit("zzzz", &SearchFilters::default(), false).await;
        agg.refresh().await;
        assert_eq!(
            agg.view().await,
            ResultsView::Error("Movie not found!".to_string())
        );

        agg.commit("nothing", &SearchFilters::default(), false).await;
        agg.refresh().await;
        assert_eq!(
            agg.view().await,
            ResultsView::NoResults {
                term: "nothing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_filter_change_resets_buffer() {
        let gateway = Arc::new(MockGateway::new().with_title("alien", 47));
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), true).await;
        agg.refresh().await;
        let first_epoch = agg.state().await.epoch;

        let movies = SearchFilters::new(KindFilter::Movie, None);
        agg.commit("alien", &movies, false).await;

        let state = agg.state().await;
        assert!(state.merged_items.is_empty());
        assert!(!state.all_shown);
        assert_eq!(state.epoch, first_epoch + 1);
        assert_eq!(agg.view().await, ResultsView::Loading);

        // Same pair again is not a new epoch.
        agg.commit("alien", &movies, false).await;
        assert_eq!(agg.state().await.epoch, first_epoch + 1);
    }

    #[tokio::test]
    async fn test_stale_fan_out_is_discarded() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_title("alien", 47)
                .with_title("aliens", 4),
        );
        let gate = gateway.hold_fan_out();
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), true).await;

        tokio::join!(agg.refresh(), async {
            while !agg.state().await.is_fetching_all {
                tokio::task::yield_now().await;
            }
            agg.commit("aliens", &SearchFilters::default(), false).await;
            agg.refresh().await;
            gate.add_permits(16);
        });

        let state = agg.state().await;
        assert_eq!(state.requested_term, "aliens");
        assert_eq!(state.merged_items.len(), 4);
        assert!(state
            .merged_items
            .iter()
            .all(|i| i.imdb_id.starts_with("aliens-")));
        assert!(!state.all_shown);
    }

    #[tokio::test]
    async fn test_stale_first_page_is_discarded() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_title("alien", 47)
                .with_title("aliens", 4),
        );
        let gate = gateway.hold_first_page("alien");
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), false).await;
        let first_epoch = agg.state().await.epoch;

        tokio::join!(agg.refresh(), async {
            while gateway.pages_requested("alien").is_empty() {
                tokio::task::yield_now().await;
            }
            agg.commit("aliens", &SearchFilters::default(), false).await;
            agg.refresh().await;
            gate.add_permits(1);
        });

        let state = agg.state().await;
        assert!(state.epoch > first_epoch);
        assert_eq!(state.requested_term, "aliens");
        assert_eq!(state.first_page, FirstPage::Loaded);
        assert_eq!(state.total_count, 4);
        assert_eq!(state.merged_items.len(), 4);
        assert!(state
            .merged_items
            .iter()
            .all(|i| i.imdb_id.starts_with("aliens-")));
        assert_eq!(gateway.pages_requested("alien"), vec![1]);
    }

    #[tokio::test]
    async fn test_batch_failure_halts_until_epoch_changes() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_title("alien", 47)
                .with_title("predator", 30)
                .panicking_page(4),
        );
        let agg = aggregator(&gateway);

        agg.commit("alien", &SearchFilters::default(), true).await;
        agg.refresh().await;

        assert_eq!(
            agg.view().await,
            ResultsView::Error(LOAD_ALL_FAILED.to_string())
        );
        let state = agg.state().await;
        assert!(state.halted);
        assert_eq!(state.merged_items.len(), 10);

        let calls = gateway.calls().len();
        agg.request_all().await;
        assert_eq!(gateway.calls().len(), calls);

        gateway.clear_panicking_pages();
        agg.commit("predator", &SearchFilters::default(), true).await;
        agg.refresh().await;
        let state = agg.state().await;
        assert!(!state.halted);
        assert_eq!(state.merged_items.len(), 30);
    }

    #[test]
    fn test_describe_with_filters() {
        let page = ResultsPage {
            term: "alien".to_string(),
            filters: SearchFilters::new(KindFilter::Movie, Some(1979)),
            items: vec![],
            total_count: 3,
            total_pages: 1,
            fetching_all: false,
            all_shown: false,
            can_load_all: false,
        };
        assert_eq!(
            page.describe(),
            "3 results for \"alien\" (Type: movie) (Year: 1979)"
        );
    }
}
