//! Conversions from wire types to domain types for the collection service.

use super::wire::{CollectionRecordResponse, CollectionStatusResponse};
use super::{CollectionRecord, CollectionStatus};

impl From<CollectionStatusResponse> for CollectionStatus {
    fn from(s: CollectionStatusResponse) -> Self {
        Self {
            is_collecting: s.is_collecting,
            symbol: s.symbol.filter(|sym| !sym.is_empty()),
            interval: s.interval.filter(|i| !i.is_empty()),
            progress: s.progress.unwrap_or_default(),
            total_collected: s.total_collected.unwrap_or_default(),
            batch_count: s.batch_count.unwrap_or_default(),
            current_batch_start: s.current_batch_start,
            current_batch_end: s.current_batch_end,
            batch_size: s.batch_size.unwrap_or_default(),
            estimated_total: s.estimated_total,
            error: s.error.filter(|e| !e.is_empty()),
        }
    }
}

impl From<CollectionRecordResponse> for CollectionRecord {
    fn from(r: CollectionRecordResponse) -> Self {
        let id = match r.id {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Self {
            id,
            symbol: r.symbol,
            interval: r.interval,
            start_time: r.start_time,
            end_time: r.end_time,
            total_collected: r.total_collected,
            status: r.status,
            created_at: r.created_at,
            error: r.error.filter(|e| !e.is_empty()),
        }
    }
}
