//! Market-data sub-client: candle queries and symbol statistics.

use crate::client::CollectorClient;
use crate::domain::kline::{Kline, KlineQuery, KlineSeries, MarketStats};
use crate::error::SdkError;
use crate::shared::{Interval, Symbol};

/// Sub-client for read-only market data.
pub struct MarketData<'a> {
    pub(crate) client: &'a CollectorClient,
}

impl<'a> MarketData<'a> {
    /// Candles matching `query`, in the order the service returns them.
    pub async fn klines(&self, query: &KlineQuery) -> Result<Vec<Kline>, SdkError> {
        let resp = self.client.http.get_kline_data(query).await?;
        Ok(resp.into_records().into_iter().map(Kline::from).collect())
    }

    /// Fetch `query` into a fresh series.
    pub async fn series(&self, query: &KlineQuery) -> Result<KlineSeries, SdkError> {
        let mut series = KlineSeries::new(query.symbol.clone(), query.interval.clone());
        series.apply_snapshot(self.klines(query).await?);
        Ok(series)
    }

    /// Aggregate statistics for one symbol.
    pub async fn stats(&self, symbol: &Symbol) -> Result<MarketStats, SdkError> {
        let resp = self.client.http.get_market_stats(symbol).await?;
        Ok(MarketStats::from_response(symbol.clone(), resp))
    }

    /// Tradable symbols. Uses TTL cache.
    pub async fn symbols(&self) -> Result<Vec<Symbol>, SdkError> {
        self.client.cached_symbols().await
    }

    /// Supported interval codes. Uses TTL cache.
    pub async fn intervals(&self) -> Result<Vec<Interval>, SdkError> {
        self.client.cached_intervals().await
    }
}
