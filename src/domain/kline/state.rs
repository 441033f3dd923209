//! Candle series state: app-owned, SDK-provided update logic.

use super::Kline;
use crate::shared::{Interval, Symbol};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Candle series for one symbol + interval, keyed by open time.
///
/// The app owns instances of this type (e.g. behind a chart widget).
/// Fetched pages can be merged in any order; later data for the same
/// open time replaces earlier data.
#[derive(Debug, Clone, Default)]
pub struct KlineSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    klines: BTreeMap<DateTime<Utc>, Kline>,
}

impl KlineSeries {
    pub fn new(symbol: Symbol, interval: Interval) -> Self {
        Self {
            symbol,
            interval,
            klines: BTreeMap::new(),
        }
    }

    /// Replace the whole series.
    pub fn apply_snapshot(&mut self, klines: Vec<Kline>) {
        self.klines.clear();
        self.merge(klines);
    }

    /// Insert a candle, overwriting any candle with the same open time.
    pub fn apply_update(&mut self, kline: Kline) {
        self.klines.insert(kline.open_time, kline);
    }

    /// Apply many updates.
    pub fn merge(&mut self, klines: impl IntoIterator<Item = Kline>) {
        for kline in klines {
            self.apply_update(kline);
        }
    }

    /// Candles in ascending open-time order.
    pub fn klines(&self) -> impl Iterator<Item = &Kline> {
        self.klines.values()
    }

    pub fn latest(&self) -> Option<&Kline> {
        self.klines.values().next_back()
    }

    pub fn earliest(&self) -> Option<&Kline> {
        self.klines.values().next()
    }

    /// Open times of the first and last candle.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.earliest()?.open_time, self.latest()?.open_time))
    }

    pub fn clear(&mut self) {
        self.klines.clear();
    }

    pub fn len(&self) -> usize {
        self.klines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.klines.is_empty()
    }
}
