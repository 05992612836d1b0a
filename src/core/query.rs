//! Search query state.
//!
//! Turns raw input, filter changes and explicit submits into a committed
//! (term, filters, fetch_all) triple. Nothing here talks to the network.

use super::debounce::Debounce;
use crate::models::config::SearchConfig;
use crate::models::media::{KindFilter, SearchFilters};
use std::time::Duration;
use tokio::time::Instant;

/// What the result view should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commitment {
    pub term: String,
    pub filters: SearchFilters,
    pub fetch_all: bool,
}

/// Phase of the query input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Debouncing,
    Committed,
}

/// Search query state machine.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    debounce: Debounce,
    min_length: usize,
    committed: Commitment,
}

impl SearchQuery {
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            debounce: Debounce::new(delay, min_length),
            min_length,
            committed: Commitment::default(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(Duration::from_millis(config.debounce_ms), config.min_length)
    }

    /// Raw input changed.
    pub fn input(&mut self, value: impl Into<String>) {
        self.input_at(value, Instant::now());
    }

    pub fn input_at(&mut self, value: impl Into<String>, now: Instant) {
        self.debounce.input_at(value, now);
    }

    /// Apply a due debounce emission. Returns true if the commitment changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debounce.tick(now) {
            self.commit_debounced()
        } else {
            false
        }
    }

    /// Wait for the pending debounce emission and apply it.
    pub async fn settle(&mut self) -> bool {
        if self.debounce.settle().await {
            self.commit_debounced()
        } else {
            false
        }
    }

    fn commit_debounced(&mut self) -> bool {
        let value = self.debounce.value();
        let term = if value.chars().count() >= self.min_length {
            value.to_string()
        } else {
            String::new()
        };
        self.commit(term, false)
    }

    fn commit(&mut self, term: String, fetch_all: bool) -> bool {
        let next = Commitment {
            term,
            filters: self.committed.filters.clone(),
            fetch_all,
        };
        let changed = next != self.committed;
        self.committed = next;
        changed
    }

    fn input_is_searchable(&self) -> bool {
        self.debounce.latest().chars().count() >= self.min_length
    }

    /// Explicit search: commit the raw input now and ask for every page.
    /// Returns false if the input is too short.
    pub fn submit(&mut self) -> bool {
        if !self.input_is_searchable() {
            return false;
        }
        self.debounce.reset();
        let term = self.debounce.latest().to_string();
        self.commit(term, true);
        true
    }

    pub fn set_kind(&mut self, kind: KindFilter) {
        self.committed.filters.kind = kind;
        self.recommit_for_filters();
    }

    pub fn set_year(&mut self, year: Option<u16>) {
        self.committed.filters.year = year;
        self.recommit_for_filters();
    }

    fn recommit_for_filters(&mut self) {
        if self.input_is_searchable() {
            let term = self.debounce.latest().to_string();
            self.commit(term, false);
        }
    }

    pub fn set_fetch_all(&mut self, fetch_all: bool) {
        self.committed.fetch_all = fetch_all;
    }

    pub fn commitment(&self) -> &Commitment {
        &self.committed
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_debouncing()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn phase(&self) -> QueryPhase {
        if self.debounce.is_debouncing() {
            QueryPhase::Debouncing
        } else if self.committed.term.is_empty() {
            QueryPhase::Idle
        } else {
            QueryPhase::Committed
        }
    }

    /// How many more characters `submit` needs, counting from an empty input.
    pub fn chars_to_submit(&self) -> usize {
        self.min_length.saturating_sub(self.debounce.latest().chars().count())
    }

    /// How many more characters are needed before a search happens.
    pub fn chars_missing(&self) -> usize {
        let len = self.debounce.latest().chars().count();
        if len == 0 {
            0
        } else {
            self.min_length.saturating_sub(len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    fn query() -> SearchQuery {
        SearchQuery::new(DELAY, 3)
    }

    #[test]
    fn test_typing_commits_after_delay_without_fetch_all() {
        let start = Instant::now();
        let mut q = query();

        q.input_at("matrix", start);
        assert_eq!(q.phase(), QueryPhase::Debouncing);
        assert!(!q.tick(start + Duration::from_millis(100)));

        assert!(q.tick(start + DELAY));
        assert_eq!(q.commitment().term, "matrix");
        assert!(!q.commitment().fetch_all);
        assert_eq!(q.phase(), QueryPhase::Committed);
    }

    #[test]
    fn test_short_input_never_commits() {
        let start = Instant::now();
        let mut q = query();

        q.input_at("ma", start);
        assert!(!q.tick(start + Duration::from_secs(5)));
        assert_eq!(q.commitment().term, "");
        assert_eq!(q.chars_missing(), 1);
        assert_eq!(q.phase(), QueryPhase::Idle);
    }

    #[test]
    fn test_clearing_commits_empty_term() {
        let start = Instant::now();
        let mut q = query();

        q.input_at("matrix", start);
        q.tick(start + DELAY);
        q.set_fetch_all(true);

        q.input_at("", start + Duration::from_secs(1));
        assert!(q.tick(start + Duration::from_secs(2)));
        assert_eq!(q.commitment().term, "");
        assert!(!q.commitment().fetch_all);
    }

    #[test]
    fn test_submit_bypasses_debounce_and_fetches_all() {
        let start = Instant::now();
        let mut q = query();

        q.input_at("matrix", start);
        assert!(q.submit());
        assert_eq!(q.commitment().term, "matrix");
        assert!(q.commitment().fetch_all);
        assert!(!q.is_debouncing());

        // The cancelled debounce emission does not override the submit.
        assert!(!q.tick(start + DELAY));
        assert!(q.commitment().fetch_all);
    }

    #[test]
    fn test_chars_to_submit_counts_from_empty() {
        let mut q = query();
        assert_eq!(q.chars_missing(), 0);
        assert_eq!(q.chars_to_submit(), 3);

        q.input("m");
        assert_eq!(q.chars_to_submit(), 2);
        q.input("matrix");
        assert_eq!(q.chars_to_submit(), 0);
    }

    #[test]
    fn test_submit_too_short_is_noop() {
        let mut q = query();
        q.input("ma");
        assert!(!q.submit());
        assert_eq!(q.commitment(), &Commitment::default());
    }

    #[test]
    fn test_filter_change_recommits_without_fetch_all() {
        let mut q = query();
        q.input("matrix");
        q.submit();

        q.set_kind(KindFilter::Movie);
        assert_eq!(q.commitment().term, "matrix");
        assert_eq!(q.commitment().filters.kind, KindFilter::Movie);
        assert!(!q.commitment().fetch_all);

        q.set_fetch_all(true);
        q.set_year(Some(1999));
        assert_eq!(q.commitment().filters.year, Some(1999));
        assert!(!q.commitment().fetch_all);
    }

    #[test]
    fn test_filter_change_without_term_only_updates_filters() {
        let mut q = query();
        q.input("ma");
        q.set_kind(KindFilter::Game);
        assert_eq!(q.commitment().term, "");
        assert_eq!(q.commitment().filters.kind, KindFilter::Game);
    }
}
