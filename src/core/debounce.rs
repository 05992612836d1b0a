//! Input debouncing.
//!
//! The debounced value follows the latest input once the input has been
//! stable for `delay`. Inputs shorter than `min_length` never propagate,
//! except the empty string, so that clearing the input is always picked up.

use std::time::Duration;
use tokio::time::Instant;

/// Debounced text value.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    min_length: usize,
    /// Latest raw input.
    latest: String,
    /// Current debounced value.
    value: String,
    /// When `latest` becomes the debounced value, if an emission is pending.
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            delay,
            min_length,
            latest: String::new(),
            value: String::new(),
            deadline: None,
        }
    }

    /// Feed a new input value, timed from now.
    pub fn input(&mut self, value: impl Into<String>) {
        self.input_at(value, Instant::now());
    }

    /// Feed a new input value observed at `now`.
    ///
    /// Any pending emission is cancelled. The new value schedules its own
    /// emission only if it is eligible.
    pub fn input_at(&mut self, value: impl Into<String>, now: Instant) {
        let value = value.into();
        if value == self.latest {
            return;
        }
        self.latest = value;
        self.deadline = self.is_eligible(&self.latest).then(|| now + self.delay);
    }

    fn is_eligible(&self, value: &str) -> bool {
        let len = value.chars().count();
        len == 0 || len >= self.min_length
    }

    /// Emit the pending value if its deadline has passed. Returns true if the
    /// debounced value was updated.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.value = self.latest.clone();
                true
            }
            _ => false,
        }
    }

    /// Wait for the pending emission, if any, and apply it.
    pub async fn settle(&mut self) -> bool {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.tick(Instant::now())
            }
            None => false,
        }
    }

    /// Align the debounced value with the latest input immediately.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.value = self.latest.clone();
    }

    /// Current debounced value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Latest raw input.
    pub fn latest(&self) -> &str {
        &self.latest
    }

    pub fn is_debouncing(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}
