//! Low-level HTTP client: `CollectorHttp`.
//!
//! One method per API endpoint. Returns wire types (conversion to domain types
//! happens at the sub-client boundary). Internal to the SDK: the high-level
//! client wraps this.

use crate::domain::collection::wire::{
    ActionResponse, CollectionHistoryResponse, CollectionStatusResponse, IntervalsResponse,
    StartCollectionRequest, SymbolsResponse,
};
use crate::domain::collection::HistoryQuery;
use crate::domain::kline::wire::{KlineDataResponse, MarketStatsResponse};
use crate::domain::kline::KlineQuery;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::Symbol;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Low-level HTTP client for the collection and market-data REST API.
#[derive(Clone)]
pub struct CollectorHttp {
    base_url: String,
    client: Client,
    /// Retry settings behind `RetryPolicy::Idempotent`.
    idempotent_retry: RetryConfig,
}

impl CollectorHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        Self::with_retry(base_url, timeout, RetryConfig::idempotent())
    }

    pub fn with_retry(
        base_url: &str,
        timeout: Duration,
        idempotent_retry: RetryConfig,
    ) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(timeout).pool_max_idle_per_host(10);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            idempotent_retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Collection ───────────────────────────────────────────────────────

    pub async fn start_collection(
        &self,
        request: &StartCollectionRequest,
    ) -> Result<ActionResponse, HttpError> {
        let url = format!("{}/api/data-collection/start", self.base_url);
        self.post(&url, Some(request), RetryPolicy::None).await
    }

    pub async fn stop_collection(&self) -> Result<ActionResponse, HttpError> {
        let url = format!("{}/api/data-collection/stop", self.base_url);
        self.post(&url, None::<&()>, RetryPolicy::None).await
    }

    pub async fn get_collection_status(&self) -> Result<CollectionStatusResponse, HttpError> {
        let url = format!("{}/api/data-collection/status", self.base_url);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn get_collection_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<CollectionHistoryResponse, HttpError> {
        let url = with_query(
            format!("{}/api/data-collection/history", self.base_url),
            &query.to_query_string(),
        );
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn get_symbols(&self) -> Result<SymbolsResponse, HttpError> {
        let url = format!("{}/api/data-collection/symbols", self.base_url);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn get_intervals(&self) -> Result<IntervalsResponse, HttpError> {
        let url = format!("{}/api/data-collection/intervals", self.base_url);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Market data ──────────────────────────────────────────────────────

    pub async fn get_kline_data(&self, query: &KlineQuery) -> Result<KlineDataResponse, HttpError> {
        let url = with_query(
            format!("{}/api/kline-data", self.base_url),
            &query.to_query_string(),
        );
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn get_market_stats(&self, symbol: &Symbol) -> Result<MarketStatsResponse, HttpError> {
        let url = format!(
            "{}/api/market-stats/{}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::POST, url, body, retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body).await;
            }
            RetryPolicy::Idempotent => self.idempotent_retry.clone(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let mut retry_after = None;
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            retry_after = retry_after_ms.map(Duration::from_millis);
                            config.retryable_statuses.contains(&429)
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => {
                            #[cfg(not(target_arch = "wasm32"))]
                            let retryable = re.is_connect() || re.is_timeout() || re.is_request();
                            #[cfg(target_arch = "wasm32")]
                            let retryable = re.is_timeout() || re.is_request();
                            retryable
                        }
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = retry_delay(&config, attempt, retry_after);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else if should_retry {
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let text = resp.text().await?;
            return parse_body(&text);
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .and_then(|secs| secs.checked_mul(1000));
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 | 403 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            408 => Err(HttpError::Timeout),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

/// One wait before the next attempt: the server's `Retry-After` when it asks
/// for longer than the backoff, never more than `max_delay`.
fn retry_delay(config: &RetryConfig, attempt: u32, retry_after: Option<Duration>) -> Duration {
    let backoff = config.delay_for_attempt(attempt);
    retry_after
        .map_or(backoff, |ra| ra.max(backoff))
        .min(config.max_delay)
}

/// Append an encoded query string, if any.
fn with_query(url: String, query: &str) -> String {
    if query.is_empty() {
        url
    } else {
        format!("{}?{}", url, query)
    }
}

/// Decode a success body. An empty body (e.g. a bare 200 from `stop`) reads as `{}`.
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, HttpError> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_json::from_str(text).map_err(|e| HttpError::InvalidBody(e.to_string()))
}
