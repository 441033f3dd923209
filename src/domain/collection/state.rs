//! Collection progress state: app-owned, SDK-provided update logic.

use super::{BatchEvent, CollectionParams, CurrentBatch, ProgressUpdate};
use crate::shared::fmt::{display_count, display_with_decimals, round_to};
use crate::shared::{Interval, Symbol};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Maximum number of batch events retained for rate estimation.
pub const HISTORY_CAPACITY: usize = 100;

/// Number of most recent events the throughput estimate looks at.
pub const RATE_WINDOW: usize = 10;

/// Progress of one collection run, fed by service progress updates.
///
/// The app owns instances of this type and decides how updates reach it
/// (status polling, a push channel, ...). All derived figures are computed
/// on demand from the stored state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressTracker {
    is_collecting: bool,
    reported_progress: f64,
    total_expected: u64,
    collected_klines: u64,
    symbol: Symbol,
    interval: Interval,
    start_time: String,
    end_time: String,
    batch_count: u64,
    current_batch: CurrentBatch,
    history: VecDeque<BatchEvent>,
    error: Option<String>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new run. Discards everything recorded for the previous one.
    pub fn start(&mut self, params: CollectionParams) {
        self.reset();
        self.is_collecting = true;
        self.symbol = params.symbol;
        self.interval = params.interval;
        self.start_time = params.start_time;
        self.end_time = params.end_time;
        self.total_expected = params.estimated_total.unwrap_or(0);
    }

    /// Apply a progress update observed now.
    pub fn record_batch(&mut self, update: ProgressUpdate) {
        self.record_batch_at(update, Utc::now());
    }

    /// Apply a progress update observed at `observed_at`.
    pub fn record_batch_at(&mut self, update: ProgressUpdate, observed_at: DateTime<Utc>) {
        self.reported_progress = update.progress;
        self.collected_klines = update.total_collected;
        self.batch_count = update.batch_count;
        self.current_batch = CurrentBatch {
            start_time: update.current_batch_start,
            end_time: update.current_batch_end,
            count: update.batch_size,
        };

        self.history.push_back(BatchEvent {
            observed_at,
            count: update.batch_size,
            progress: update.progress,
        });
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Mark the run finished. Idempotent.
    pub fn complete(&mut self) {
        self.is_collecting = false;
        self.reported_progress = 100.0;
    }

    /// Record the latest service-side error. Does not stop the run.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(symbol = %self.symbol, "Collection error: {}", message);
        self.error = Some(message);
    }

    /// Forget the last service-side error once the service stops reporting it.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ── Derived figures ──────────────────────────────────────────────────

    /// Collected / expected as a percentage, 2 decimal places, capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        if self.total_expected == 0 {
            return 0.0;
        }
        let pct = self.collected_klines as f64 / self.total_expected as f64 * 100.0;
        round_to(pct, 2).min(100.0)
    }

    /// Records per second over the most recent [`RATE_WINDOW`] events.
    ///
    /// The first event of the window only anchors the time axis: its count
    /// is not attributed to any interval.
    pub fn collection_rate(&self) -> f64 {
        if self.history.len() < 2 {
            return 0.0;
        }

        let skip = self.history.len().saturating_sub(RATE_WINDOW);
        let window: Vec<&BatchEvent> = self.history.iter().skip(skip).collect();

        let mut total_ms: i64 = 0;
        let mut total_count: u64 = 0;
        for pair in window.windows(2) {
            total_ms += (pair[1].observed_at - pair[0].observed_at).num_milliseconds();
            total_count += pair[1].count;
        }

        if total_ms <= 0 {
            return 0.0;
        }
        round_to(total_count as f64 / (total_ms as f64 / 1000.0), 2)
    }

    /// Projected time until `total_expected` is reached at the current rate.
    pub fn estimated_time_remaining(&self) -> TimeRemaining {
        let rate = self.collection_rate();
        if rate <= 0.0 || self.total_expected <= self.collected_klines {
            return TimeRemaining::None;
        }
        let remaining = (self.total_expected - self.collected_klines) as f64;
        TimeRemaining::from_secs(remaining / rate)
    }

    /// All derived figures at once, for display.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            is_collecting: self.is_collecting,
            percentage: self.progress_percentage(),
            collected: self.collected_klines,
            expected: self.total_expected,
            batch_count: self.batch_count,
            rate: self.collection_rate(),
            remaining: self.estimated_time_remaining(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn is_collecting(&self) -> bool {
        self.is_collecting
    }

    /// Last progress value reported by the service (100 once completed).
    pub fn reported_progress(&self) -> f64 {
        self.reported_progress
    }

    pub fn total_expected(&self) -> u64 {
        self.total_expected
    }

    pub fn collected_klines(&self) -> u64 {
        self.collected_klines
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count
    }

    pub fn current_batch(&self) -> &CurrentBatch {
        &self.current_batch
    }

    /// Retained batch events, oldest first.
    pub fn history(&self) -> &VecDeque<BatchEvent> {
        &self.history
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// ─── TimeRemaining ───────────────────────────────────────────────────────────

/// Remaining-time estimate, rounded up to the coarsest fitting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    /// Nothing left, or no rate to extrapolate from.
    None,
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
}

impl TimeRemaining {
    /// Bucket a number of seconds: under a minute, under an hour, or hours.
    pub fn from_secs(secs: f64) -> Self {
        if secs < 60.0 {
            Self::Seconds(secs.ceil() as u64)
        } else if secs < 3600.0 {
            Self::Minutes((secs / 60.0).ceil() as u64)
        } else {
            Self::Hours((secs / 3600.0).ceil() as u64)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "0"),
            Self::Seconds(n) => write!(f, "{}s", n),
            Self::Minutes(n) => write!(f, "{}m", n),
            Self::Hours(n) => write!(f, "{}h", n),
        }
    }
}

// ─── ProgressSnapshot ────────────────────────────────────────────────────────

/// Point-in-time copy of a tracker's derived figures.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub is_collecting: bool,
    pub percentage: f64,
    pub collected: u64,
    pub expected: u64,
    pub batch_count: u64,
    pub rate: f64,
    pub remaining: TimeRemaining,
}

impl std::fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}% ({} / {} klines, {} batches) at {}/s, ETA {}",
            display_with_decimals(self.percentage, 2),
            display_count(self.collected),
            display_count(self.expected),
            display_count(self.batch_count),
            display_with_decimals(self.rate, 2),
            self.remaining
        )
    }
}
