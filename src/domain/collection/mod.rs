//! Collection domain: job control, progress tracking, batch planning.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod plan;
pub mod state;
pub mod wire;

use crate::shared::{Interval, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use plan::{BatchWindow, CollectionPlan, TimeRange};
pub use state::{ProgressSnapshot, ProgressTracker, TimeRemaining};

/// Parameters of a collection run as seen by the progress tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionParams {
    pub symbol: Symbol,
    pub interval: Interval,
    pub start_time: String,
    pub end_time: String,
    /// Expected number of candles, if the caller estimated one.
    pub estimated_total: Option<u64>,
}

/// One progress notification from the collection service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Service-reported progress percentage.
    pub progress: f64,
    pub total_collected: u64,
    pub batch_count: u64,
    pub current_batch_start: String,
    pub current_batch_end: String,
    /// Number of candles in the batch that triggered this update.
    pub batch_size: u64,
}

/// The batch most recently reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBatch {
    pub start_time: String,
    pub end_time: String,
    pub count: u64,
}

/// One observation of newly collected records, used for rate estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvent {
    /// Wall-clock time the update was observed (not business time).
    pub observed_at: DateTime<Utc>,
    pub count: u64,
    pub progress: f64,
}

/// Status snapshot of the collection job on the service side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStatus {
    pub is_collecting: bool,
    pub symbol: Option<Symbol>,
    pub interval: Option<Interval>,
    pub progress: f64,
    pub total_collected: u64,
    pub batch_count: u64,
    pub current_batch_start: Option<String>,
    pub current_batch_end: Option<String>,
    pub batch_size: u64,
    pub estimated_total: Option<u64>,
    pub error: Option<String>,
}

impl CollectionStatus {
    /// Convert this snapshot into a tracker update.
    pub fn to_progress_update(&self) -> ProgressUpdate {
        ProgressUpdate {
            progress: self.progress,
            total_collected: self.total_collected,
            batch_count: self.batch_count,
            current_batch_start: self.current_batch_start.clone().unwrap_or_default(),
            current_batch_end: self.current_batch_end.clone().unwrap_or_default(),
            batch_size: self.batch_size,
        }
    }
}

/// One historical collection run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRecord {
    pub id: Option<String>,
    pub symbol: Symbol,
    pub interval: Interval,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub total_collected: u64,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Filters for `/api/data-collection/history`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub symbol: Option<Symbol>,
    pub interval: Option<Interval>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn interval(mut self, interval: impl Into<Interval>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Encoded query string without the leading `?` (empty when no filter is set).
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(s) = &self.symbol {
            params.push(format!("symbol={}", urlencoding::encode(s.as_str())));
        }
        if let Some(i) = &self.interval {
            params.push(format!("interval={}", urlencoding::encode(i.as_str())));
        }
        if let Some(l) = self.limit {
            params.push(format!("limit={}", l));
        }
        if let Some(o) = self.offset {
            params.push(format!("offset={}", o));
        }
        params.join("&")
    }
}
