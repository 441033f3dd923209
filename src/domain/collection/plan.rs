//! Collection planning: time ranges, candle estimates and batch windows.
//!
//! Mirrors the arithmetic the collector runs on the service side, so a caller
//! can estimate the expected total before starting a job and interpret the
//! batch boundaries it reports.

use super::wire::StartCollectionRequest;
use super::CollectionParams;
use crate::error::PlanError;
use crate::shared::{Interval, Symbol};
use chrono::{DateTime, NaiveDate, Utc};

/// Candles requested per batch when the request does not say.
pub const DEFAULT_BATCH_SIZE: u32 = 1000;

/// Offset from midnight to 23:59:59 of the same day.
pub const END_OF_DAY_MS: i64 = 86_399_000;

/// Parse `YYYY-MM-DD` as midnight UTC, in epoch milliseconds.
pub fn parse_date_ms(value: &str) -> Result<i64, PlanError> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        PlanError::InvalidDate {
            value: value.to_string(),
        }
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| PlanError::InvalidDate {
            value: value.to_string(),
        })?;
    Ok(midnight.and_utc().timestamp_millis())
}

// ─── TimeRange ───────────────────────────────────────────────────────────────

/// A closed range of epoch milliseconds. Always `start_ms <= end_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start_ms: i64,
    end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, PlanError> {
        if end_ms < start_ms {
            return Err(PlanError::InvertedRange { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Range from a start date to the end of an end date, or to `now`.
    pub fn from_dates(
        start: &str,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        let start_ms = parse_date_ms(start)?;
        let end_ms = match end {
            Some(e) => parse_date_ms(e)? + END_OF_DAY_MS,
            None => now.timestamp_millis(),
        };
        Self::new(start_ms, end_ms)
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

// ─── BatchWindow ─────────────────────────────────────────────────────────────

/// The time span one batch request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    /// 1-based batch number.
    pub index: u64,
    pub start_ms: i64,
    pub end_ms: i64,
}

// ─── CollectionPlan ──────────────────────────────────────────────────────────

/// How a collection run walks its time range. Built through [`CollectionPlan::new`],
/// so the batch size is never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPlan {
    symbol: Symbol,
    interval: Interval,
    range: TimeRange,
    batch_size: u32,
}

impl CollectionPlan {
    pub fn new(
        symbol: Symbol,
        interval: Interval,
        range: TimeRange,
        batch_size: u32,
    ) -> Result<Self, PlanError> {
        if batch_size == 0 {
            return Err(PlanError::ZeroBatchSize);
        }
        Ok(Self {
            symbol,
            interval,
            range,
            batch_size,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Candle duration; unknown interval codes count as one hour.
    pub fn interval_ms(&self) -> u64 {
        self.interval.millis_or_default()
    }

    /// Rough number of candles in the range.
    pub fn estimated_klines(&self) -> u64 {
        u64::try_from(self.range.duration_ms()).unwrap_or(0) / self.interval_ms().max(1)
    }

    /// Time span of a full batch.
    pub fn window_span_ms(&self) -> i64 {
        self.batch_size as i64 * self.interval_ms() as i64
    }

    /// The window that starts at `start_ms`, or `None` once the range is exhausted.
    pub fn window_at(&self, index: u64, start_ms: i64) -> Option<BatchWindow> {
        if start_ms >= self.range.end_ms {
            return None;
        }
        Some(BatchWindow {
            index,
            start_ms,
            end_ms: (start_ms + self.window_span_ms()).min(self.range.end_ms),
        })
    }

    /// Where the batch after `window` starts.
    ///
    /// After a batch that returned data, the next one starts one interval past
    /// the last candle's open time; after an empty batch, at the window end.
    pub fn next_start(&self, window: &BatchWindow, last_open_time_ms: Option<i64>) -> i64 {
        match last_open_time_ms {
            Some(last) => last + self.interval_ms() as i64,
            None => window.end_ms,
        }
    }

    /// Every window, assuming each batch advances by a full span.
    pub fn windows(&self) -> Vec<BatchWindow> {
        let mut windows = Vec::new();
        let mut start = self.range.start_ms;
        let mut index = 1;
        while let Some(window) = self.window_at(index, start) {
            let next = self.next_start(&window, None);
            windows.push(window);
            if next <= start {
                break;
            }
            start = next;
            index += 1;
        }
        windows
    }

    /// Share of the range behind `position_ms`, as a percentage in `[0, 100]`.
    pub fn progress_at(&self, position_ms: i64) -> f64 {
        let span = self.range.duration_ms();
        if span <= 0 {
            return 100.0;
        }
        let done = (position_ms - self.range.start_ms) as f64 / span as f64 * 100.0;
        done.clamp(0.0, 100.0)
    }

    /// Tracker parameters for this plan, with the candle estimate filled in.
    pub fn to_params(&self, start_time: &str, end_time: &str) -> CollectionParams {
        CollectionParams {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            estimated_total: Some(self.estimated_klines()),
        }
    }
}

impl StartCollectionRequest {
    /// Plan this request; an open-ended request runs until `now`.
    pub fn plan(&self, now: DateTime<Utc>) -> Result<CollectionPlan, PlanError> {
        let range = TimeRange::from_dates(&self.start_time, self.end_time.as_deref(), now)?;
        CollectionPlan::new(
            self.symbol.clone(),
            self.interval.clone(),
            range,
            self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        )
    }

    /// Tracker parameters for this request, estimating the total from its plan.
    pub fn to_params(&self, now: DateTime<Utc>) -> Result<CollectionParams, PlanError> {
        let plan = self.plan(now)?;
        let end_time = self.end_time.clone().unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
        Ok(plan.to_params(&self.start_time, &end_time))
    }
}
