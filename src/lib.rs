//! # K-line Collector SDK
//!
//! A Rust client for the K-line data collection service: start and stop
//! historical collection jobs, follow their progress, and query the
//! collected candle series.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: Newtypes, domain models, state containers, planning (always available, WASM-safe)
//! 2. **HTTP API**: `CollectorHttp` with per-endpoint retry policies
//! 3. **High-Level Client**: `CollectorClient` with nested sub-clients and a metadata cache
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kline_collector_sdk::prelude::*;
//! use std::time::Duration;
//!
//! let client = CollectorClient::builder()
//!     .base_url("http://localhost:5000")
//!     .build()?;
//!
//! let request = StartCollectionRequest::new("BTC-USDT", "1h", "2025-01-01").end_time("2025-07-02");
//! client.collection().start(&request).await?;
//!
//! let mut tracker = ProgressTracker::new();
//! tracker.start(request.to_params(chrono::Utc::now())?);
//! client.collection().track(&mut tracker, Duration::from_secs(2)).await?;
//! println!("{}", tracker.snapshot());
//!
//! let klines = client.market_data().klines(&KlineQuery::new("BTC-USDT", "1h").limit(500)).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and formatting helpers used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network defaults and environment variable names.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `CollectorClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Interval, Symbol};

    // Domain types: collection
    pub use crate::domain::collection::wire::{ActionResponse, StartCollectionRequest};
    pub use crate::domain::collection::{
        BatchEvent, BatchWindow, CollectionParams, CollectionPlan, CollectionRecord,
        CollectionStatus, CurrentBatch, HistoryQuery, ProgressUpdate, TimeRange,
    };

    // Domain types: kline
    pub use crate::domain::kline::{Kline, KlineQuery, MarketStats};

    // Errors
    pub use crate::error::{HttpError, PlanError, SdkError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        CollectionClient, CollectorClient, CollectorClientBuilder, MarketDataClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // State containers
    pub use crate::domain::collection::{ProgressSnapshot, ProgressTracker, TimeRemaining};
    pub use crate::domain::kline::KlineSeries;
}
