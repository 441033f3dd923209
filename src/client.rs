//! High-level client: `CollectorClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared metadata cache, and accessor methods.

use crate::domain::collection::client::Collection;
use crate::domain::kline::client::MarketData;
use crate::error::SdkError;
use crate::http::{CollectorHttp, RetryConfig};
use crate::network::{API_URL_ENV, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, TIMEOUT_SECS_ENV};
use crate::shared::{Interval, Symbol};

use async_lock::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Re-export sub-client types for convenience.
pub use crate::domain::collection::client::Collection as CollectionClient;
pub use crate::domain::kline::client::MarketData as MarketDataClient;

/// Symbol and interval lists published by the service. Both change rarely.
#[derive(Debug, Default)]
pub(crate) struct MetadataCache {
    symbols: Option<(Vec<Symbol>, Instant)>,
    intervals: Option<(Vec<Interval>, Instant)>,
}

/// The primary entry point for the SDK.
///
/// Provides nested sub-client accessors: `client.collection()`,
/// `client.market_data()`.
#[derive(Clone)]
pub struct CollectorClient {
    pub(crate) http: CollectorHttp,
    pub(crate) metadata_cache: Arc<RwLock<MetadataCache>>,
    pub(crate) metadata_cache_ttl: Duration,
}

impl CollectorClient {
    pub fn builder() -> CollectorClientBuilder {
        CollectorClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn collection(&self) -> Collection<'_> {
        Collection { client: self }
    }

    pub fn market_data(&self) -> MarketData<'_> {
        MarketData { client: self }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Drop cached symbol and interval lists.
    pub async fn clear_all_caches(&self) {
        let mut cache = self.metadata_cache.write().await;
        cache.symbols = None;
        cache.intervals = None;
    }

    // ── Shared metadata (used by both sub-clients) ───────────────────────

    pub(crate) async fn cached_symbols(&self) -> Result<Vec<Symbol>, SdkError> {
        {
            let cache = self.metadata_cache.read().await;
            if let Some((symbols, fetched_at)) = &cache.symbols {
                if fetched_at.elapsed() < self.metadata_cache_ttl {
                    tracing::debug!(count = symbols.len(), "Symbol list served from cache");
                    return Ok(symbols.clone());
                }
            }
        }

        let symbols = self.http.get_symbols().await?.into_vec();
        self.metadata_cache.write().await.symbols = Some((symbols.clone(), Instant::now()));
        Ok(symbols)
    }

    pub(crate) async fn cached_intervals(&self) -> Result<Vec<Interval>, SdkError> {
        {
            let cache = self.metadata_cache.read().await;
            if let Some((intervals, fetched_at)) = &cache.intervals {
                if fetched_at.elapsed() < self.metadata_cache_ttl {
                    tracing::debug!(count = intervals.len(), "Interval list served from cache");
                    return Ok(intervals.clone());
                }
            }
        }

        let intervals = self.http.get_intervals().await?.into_vec();
        self.metadata_cache.write().await.intervals = Some((intervals.clone(), Instant::now()));
        Ok(intervals)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CollectorClientBuilder {
    base_url: String,
    timeout: Duration,
    metadata_cache_ttl: Duration,
    retry: RetryConfig,
}

impl Default for CollectorClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            metadata_cache_ttl: Duration::from_secs(300),
            retry: RetryConfig::idempotent(),
        }
    }
}

impl CollectorClientBuilder {
    /// Seed the builder from `KLINE_COLLECTOR_API_URL` and
    /// `KLINE_COLLECTOR_TIMEOUT_SECS`; unset variables keep the defaults.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let mut builder = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            builder.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_SECS_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                SdkError::Config(format!("{} must be whole seconds, got {:?}", TIMEOUT_SECS_ENV, raw))
            })?;
            builder.timeout = Duration::from_secs(secs);
        }
        Ok(builder)
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Per-request timeout (native targets).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn metadata_cache_ttl(mut self, ttl: Duration) -> Self {
        self.metadata_cache_ttl = ttl;
        self
    }

    /// Retry settings for idempotent (GET) requests.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    pub fn build(self) -> Result<CollectorClient, SdkError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        Ok(CollectorClient {
            http: CollectorHttp::with_retry(&self.base_url, self.timeout, self.retry)?,
            metadata_cache: Arc::new(RwLock::new(MetadataCache::default())),
            metadata_cache_ttl: self.metadata_cache_ttl,
        })
    }
}
