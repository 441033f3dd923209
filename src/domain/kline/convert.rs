//! Conversions from wire types to domain types for candles and statistics.

use super::wire::{KlineRecord, MarketStatsResponse};
use super::{Kline, MarketStats};
use crate::shared::Symbol;

impl From<KlineRecord> for Kline {
    fn from(r: KlineRecord) -> Self {
        Self {
            open_time: r.timestamp,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            close_time: r.close_time,
            quote_volume: r.quote_volume,
            trade_count: r.trade_count,
        }
    }
}

impl MarketStats {
    /// Attach the queried symbol; the stats payload does not echo it back.
    pub(crate) fn from_response(symbol: Symbol, r: MarketStatsResponse) -> Self {
        Self {
            symbol,
            high_price: r.high_price,
            low_price: r.low_price,
            avg_price: r.avg_price,
            total_volume: r.total_volume,
            price_change: r.price_change,
            price_change_pct: r.price_change_pct,
        }
    }
}
