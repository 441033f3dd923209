//! K-line domain: candle series and per-symbol market statistics.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{Interval, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::KlineSeries;

/// One candle: open/high/low/close/volume over one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: Option<DateTime<Utc>>,
    pub quote_volume: Option<Decimal>,
    pub trade_count: Option<u64>,
}

impl Kline {
    /// Close at or above open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// High minus low.
    pub fn spread(&self) -> Decimal {
        self.high - self.low
    }
}

/// Aggregate statistics for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub symbol: Symbol,
    pub high_price: Option<Decimal>,
    pub low_price: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub total_volume: Option<Decimal>,
    pub price_change: Option<Decimal>,
    pub price_change_pct: Option<Decimal>,
}

/// Filters for `/api/kline-data`. Optional bounds are omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: Symbol,
    pub interval: Interval,
    /// ISO 8601 string or epoch millis, passed through as given.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub limit: Option<u32>,
}

impl KlineQuery {
    pub fn new(symbol: impl Into<Symbol>, interval: impl Into<Interval>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn start_time(mut self, start: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self
    }

    pub fn end_time(mut self, end: impl Into<String>) -> Self {
        self.end_time = Some(end.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut params = vec![
            format!("symbol={}", urlencoding::encode(self.symbol.as_str())),
            format!("interval={}", urlencoding::encode(self.interval.as_str())),
        ];
        if let Some(s) = self.start_time.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("start_time={}", urlencoding::encode(s)));
        }
        if let Some(e) = self.end_time.as_deref().filter(|e| !e.is_empty()) {
            params.push(format!("end_time={}", urlencoding::encode(e)));
        }
        if let Some(l) = self.limit {
            params.push(format!("limit={}", l));
        }
        params.join("&")
    }
}
