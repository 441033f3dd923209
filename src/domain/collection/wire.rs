//! Wire types for the collection service (REST).
//!
//! Field names are snake_case with camelCase aliases: the service's progress
//! payloads use `totalCollected`-style keys while its REST handlers use
//! `total_collected`.

use crate::shared::serde_util::flexible_timestamp;
use crate::shared::{Interval, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/data-collection/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCollectionRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    /// `YYYY-MM-DD`
    pub start_time: String,
    /// `YYYY-MM-DD`; the service collects up to now when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Candles per exchange request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    /// Pause between batches, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<u64>,
}

impl StartCollectionRequest {
    pub fn new(
        symbol: impl Into<Symbol>,
        interval: impl Into<Interval>,
        start_time: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start_time: start_time.into(),
            end_time: None,
            batch_size: None,
            sleep_time: None,
        }
    }

    pub fn end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn sleep_time(mut self, secs: u64) -> Self {
        self.sleep_time = Some(secs);
        self
    }
}

/// Acknowledgement returned by start/stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "jobId", alias = "task_id")]
    pub job_id: Option<String>,
}

/// `GET /api/data-collection/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionStatusResponse {
    #[serde(default, alias = "isCollecting")]
    pub is_collecting: bool,
    #[serde(default)]
    pub symbol: Option<Symbol>,
    #[serde(default)]
    pub interval: Option<Interval>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default, alias = "totalCollected")]
    pub total_collected: Option<u64>,
    #[serde(default, alias = "batchCount")]
    pub batch_count: Option<u64>,
    #[serde(default, alias = "currentBatchStart")]
    pub current_batch_start: Option<String>,
    #[serde(default, alias = "currentBatchEnd")]
    pub current_batch_end: Option<String>,
    #[serde(default, alias = "batchSize")]
    pub batch_size: Option<u64>,
    #[serde(default, alias = "estimatedKlines", alias = "estimated_klines")]
    pub estimated_total: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of `GET /api/data-collection/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionRecordResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub symbol: Symbol,
    pub interval: Interval,
    #[serde(default, alias = "startTime")]
    pub start_time: Option<String>,
    #[serde(default, alias = "endTime")]
    pub end_time: Option<String>,
    #[serde(default, alias = "totalCollected")]
    pub total_collected: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "createdAt", with = "flexible_timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// History list, either bare or wrapped in an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CollectionHistoryResponse {
    Bare(Vec<CollectionRecordResponse>),
    Wrapped {
        #[serde(alias = "history", alias = "records")]
        data: Vec<CollectionRecordResponse>,
    },
}

impl CollectionHistoryResponse {
    pub fn into_records(self) -> Vec<CollectionRecordResponse> {
        match self {
            Self::Bare(records) | Self::Wrapped { data: records } => records,
        }
    }
}

/// `GET /api/data-collection/symbols`, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SymbolsResponse {
    Bare(Vec<Symbol>),
    Wrapped {
        #[serde(alias = "symbols")]
        data: Vec<Symbol>,
    },
}

impl SymbolsResponse {
    pub fn into_vec(self) -> Vec<Symbol> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

/// `GET /api/data-collection/intervals`, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntervalsResponse {
    Bare(Vec<Interval>),
    Wrapped {
        #[serde(alias = "intervals")]
        data: Vec<Interval>,
    },
}

impl IntervalsResponse {
    pub fn into_vec(self) -> Vec<Interval> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}
