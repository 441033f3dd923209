//! Wire types for candle and market-statistics responses (REST).

use crate::shared::serde_util::{flexible_decimal, flexible_timestamp};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One candle row as the data service serialises it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KlineRecord {
    #[serde(alias = "time", alias = "open_time", with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(with = "flexible_decimal")]
    pub open: Decimal,
    #[serde(with = "flexible_decimal")]
    pub high: Decimal,
    #[serde(with = "flexible_decimal")]
    pub low: Decimal,
    #[serde(with = "flexible_decimal")]
    pub close: Decimal,
    #[serde(with = "flexible_decimal")]
    pub volume: Decimal,
    #[serde(default, with = "flexible_timestamp::option")]
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_decimal::option")]
    pub quote_volume: Option<Decimal>,
    #[serde(default)]
    pub trade_count: Option<u64>,
}

/// `GET /api/kline-data`, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KlineDataResponse {
    Bare(Vec<KlineRecord>),
    Wrapped {
        #[serde(alias = "klines")]
        data: Vec<KlineRecord>,
    },
}

impl KlineDataResponse {
    pub fn into_records(self) -> Vec<KlineRecord> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

/// `GET /api/market-stats/{symbol}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketStatsResponse {
    #[serde(default, with = "flexible_decimal::option")]
    pub high_price: Option<Decimal>,
    #[serde(default, with = "flexible_decimal::option")]
    pub low_price: Option<Decimal>,
    #[serde(default, with = "flexible_decimal::option")]
    pub avg_price: Option<Decimal>,
    #[serde(default, with = "flexible_decimal::option")]
    pub total_volume: Option<Decimal>,
    #[serde(default, with = "flexible_decimal::option")]
    pub price_change: Option<Decimal>,
    #[serde(
        default,
        alias = "price_change_percent",
        with = "flexible_decimal::option"
    )]
    pub price_change_pct: Option<Decimal>,
}
