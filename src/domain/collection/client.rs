//! Collection sub-client: job control, status, history, status polling.

use crate::client::CollectorClient;
use crate::domain::collection::wire::{ActionResponse, StartCollectionRequest};
use crate::domain::collection::{CollectionRecord, CollectionStatus, HistoryQuery, ProgressTracker};
use crate::error::SdkError;
use crate::http::CollectorHttp;
use crate::shared::{Interval, Symbol};

use futures_util::{Stream, StreamExt};
use std::time::Duration;

/// Sub-client for the collection service.
pub struct Collection<'a> {
    pub(crate) client: &'a CollectorClient,
}

impl<'a> Collection<'a> {
    /// Ask the service to start a collection job.
    pub async fn start(&self, request: &StartCollectionRequest) -> Result<ActionResponse, SdkError> {
        let resp = self.client.http.start_collection(request).await?;
        let resp = accepted(resp)?;
        tracing::info!(
            symbol = %request.symbol,
            interval = %request.interval,
            start = %request.start_time,
            "Collection job started"
        );
        Ok(resp)
    }

    /// Ask the service to halt the active job.
    pub async fn stop(&self) -> Result<ActionResponse, SdkError> {
        let resp = accepted(self.client.http.stop_collection().await?)?;
        tracing::info!("Collection job stopped");
        Ok(resp)
    }

    /// Current job status snapshot.
    pub async fn status(&self) -> Result<CollectionStatus, SdkError> {
        Ok(self.client.http.get_collection_status().await?.into())
    }

    /// Past collection runs matching `query`.
    pub async fn history(&self, query: &HistoryQuery) -> Result<Vec<CollectionRecord>, SdkError> {
        let resp = self.client.http.get_collection_history(query).await?;
        Ok(resp
            .into_records()
            .into_iter()
            .map(CollectionRecord::from)
            .collect())
    }

    /// Tradable symbols. Uses TTL cache.
    pub async fn symbols(&self) -> Result<Vec<Symbol>, SdkError> {
        self.client.cached_symbols().await
    }

    /// Supported interval codes. Uses TTL cache.
    pub async fn intervals(&self) -> Result<Vec<Interval>, SdkError> {
        self.client.cached_intervals().await
    }

    /// Poll `status` every `poll_interval`.
    ///
    /// The first poll happens immediately. The stream ends after yielding a
    /// snapshot that is no longer collecting, or after yielding an error.
    pub fn watch(&self, poll_interval: Duration) -> impl Stream<Item = Result<CollectionStatus, SdkError>> {
        watch_status(self.client.http.clone(), poll_interval)
    }

    /// Drive `tracker` from status polling until the job stops.
    ///
    /// A snapshot is recorded only when its batch count moved, so repeated
    /// polls of the same batch do not count it twice. Service-side errors go
    /// to `set_error`; a failed poll is returned and leaves the tracker as is.
    pub async fn track(
        &self,
        tracker: &mut ProgressTracker,
        poll_interval: Duration,
    ) -> Result<(), SdkError> {
        let stream = self.watch(poll_interval);
        futures_util::pin_mut!(stream);

        while let Some(item) = stream.next().await {
            let status = item?;
            apply_status(tracker, &status);
        }
        Ok(())
    }
}

/// Fold one status snapshot into the tracker.
///
/// The tracker mirrors the service's current error: a running job that no
/// longer reports one clears it. A finished job keeps its last error.
pub(crate) fn apply_status(tracker: &mut ProgressTracker, status: &CollectionStatus) {
    match &status.error {
        Some(err) if tracker.error() != Some(err.as_str()) => tracker.set_error(err.clone()),
        None if status.is_collecting && tracker.error().is_some() => tracker.clear_error(),
        _ => {}
    }
    if status.batch_count != tracker.batch_count() {
        tracker.record_batch(status.to_progress_update());
    }
    if !status.is_collecting {
        tracker.complete();
    }
}

#[derive(Clone, Copy)]
enum WatchState {
    First,
    Polling,
    Done,
}

fn watch_status(
    http: CollectorHttp,
    poll_interval: Duration,
) -> impl Stream<Item = Result<CollectionStatus, SdkError>> {
    futures_util::stream::unfold(WatchState::First, move |state| {
        let http = http.clone();
        async move {
            match state {
                WatchState::Done => return None,
                WatchState::Polling => futures_timer::Delay::new(poll_interval).await,
                WatchState::First => {}
            }
            match http.get_collection_status().await {
                Ok(resp) => {
                    let status = CollectionStatus::from(resp);
                    let next = if status.is_collecting {
                        WatchState::Polling
                    } else {
                        WatchState::Done
                    };
                    Some((Ok(status), next))
                }
                Err(e) => {
                    tracing::warn!("Status poll failed: {}", e);
                    Some((Err(e.into()), WatchState::Done))
                }
            }
        }
    })
}

/// Turn an explicit `success: false` acknowledgement into an error.
fn accepted(resp: ActionResponse) -> Result<ActionResponse, SdkError> {
    if resp.success == Some(false) {
        let reason = resp
            .error
            .or(resp.message)
            .unwrap_or_else(|| "no reason given".to_string());
        return Err(SdkError::Rejected(reason));
    }
    Ok(resp)
}
