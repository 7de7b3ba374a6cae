//! State carried from one poll cycle to the next

use crate::homework::ReviewItem;

/// Poller state. Owned by the poller alone and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    /// Server timestamp the next query is anchored on
    pub resume_marker: i64,
    /// Newest homework we have already sent a message about
    pub last_notified: Option<ReviewItem>,
    /// Summary of the last failure announced to the chat
    pub last_reported_error: Option<String>,
    /// Number of cycles run since start
    pub cycle_count: u64,
}

impl LoopState {
    /// Fresh state anchored at `now` (unix seconds)
    pub fn new(now: i64) -> Self {
        Self {
            resume_marker: now,
            last_notified: None,
            last_reported_error: None,
            cycle_count: 0,
        }
    }

    /// Record the start of a cycle
    pub fn tick(&mut self) {
        self.cycle_count += 1;
    }

    /// Lower bound for the next query, looking back one interval
    pub fn query_since(&self, interval_secs: u64) -> i64 {
        let lookback = i64::try_from(interval_secs).unwrap_or(i64::MAX);
        self.resume_marker.saturating_sub(lookback)
    }

    /// Move the marker forward if the server supplied one
    pub fn advance(&mut self, marker: Option<i64>) {
        if let Some(marker) = marker {
            self.resume_marker = marker;
        }
    }

    /// Remember a homework whose message was delivered
    pub fn mark_notified(&mut self, item: ReviewItem) {
        self.last_notified = Some(item);
    }

    /// Record a failure summary. Returns false if it repeats the last one.
    pub fn record_error(&mut self, summary: &str) -> bool {
        if self.last_reported_error.as_deref() == Some(summary) {
            return false;
        }
        self.last_reported_error = Some(summary.to_string());
        true
    }

    /// Forget the last failure after a clean cycle
    pub fn clear_error(&mut self) {
        self.last_reported_error = None;
    }
}
