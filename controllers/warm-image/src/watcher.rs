//! WarmImage watch-stream consumer.
//!
//! Maintains a resumable cluster-wide subscription to WarmImage change
//! events and feeds each event to the reconciler. The resume cursor is
//! explicit state threaded through the loop: it advances only after an
//! event is fully processed, so a crash or per-event failure leads to
//! redelivery rather than a silent skip.

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use cluster_client::{ClusterClientTrait, ClusterError};
use crds::WarmImage;
use futures::StreamExt;
use kube::api::WatchEvent;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Resume token for the WarmImage subscription.
///
/// Empty at cold start and after the platform rejects it as expired; never
/// rolled back otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchCursor(Option<String>);

impl WatchCursor {
    /// Moves the cursor past the given revision.
    pub fn advance(&mut self, resource_version: impl Into<String>) {
        self.0 = Some(resource_version.into());
    }

    /// Clears the cursor so the next subscription starts fresh.
    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// The token to resume from; empty string when unset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }
}

/// What handling one event means for the resume cursor.
#[derive(Debug, PartialEq, Eq)]
pub enum EventDisposition {
    /// Event handled; resume after this revision.
    Advance(String),
    /// Event handled or skipped without a usable revision; cursor unchanged.
    Stay,
    /// The platform invalidated the cursor; resubscribe from scratch.
    Expired,
}

/// Watches WarmImage resources and drives reconciliation.
pub struct Watcher<C> {
    client: Arc<C>,
    reconciler: Arc<Reconciler<C>>,
}

impl<C: ClusterClientTrait> Watcher<C> {
    /// Creates a new watcher instance.
    pub fn new(client: Arc<C>, reconciler: Arc<Reconciler<C>>) -> Self {
        Self { client, reconciler }
    }

    /// Runs the consumer loop until the process is terminated.
    ///
    /// Every subscription eventually ends (clean close, stream error, or an
    /// expired cursor); the loop resubscribes from the last good cursor with
    /// Fibonacci backoff, reset as soon as a subscription delivers events.
    pub async fn run(&self) -> Result<(), ControllerError> {
        info!("Starting WarmImage watcher");

        let mut cursor = WatchCursor::default();
        let mut backoff = FibonacciBackoff::new(1, 60);
        loop {
            let (next, delivered) = self.subscribe_once(cursor).await;
            cursor = next;
            if delivered > 0 {
                backoff.reset();
            }
            let delay = backoff.next_backoff();
            debug!("WarmImage watch ended; resubscribing in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// Consumes one subscription attempt until its stream ends.
    ///
    /// Returns the cursor to resume from (reset if the platform declared it
    /// expired) and the number of events the stream delivered.
    pub(crate) async fn subscribe_once(&self, mut cursor: WatchCursor) -> (WatchCursor, usize) {
        let subscription = self.client.watch_warm_images(cursor.as_str()).await;
        let mut stream = match subscription {
            Ok(stream) => stream,
            Err(ClusterError::CursorExpired(message)) => {
                warn!(
                    "Watch cursor {:?} expired: {}; resubscribing from scratch",
                    cursor.as_str(),
                    message
                );
                cursor.reset();
                return (cursor, 0);
            }
            Err(err) => {
                error!("Failed to open WarmImage watch: {}", err);
                return (cursor, 0);
            }
        };

        let mut delivered = 0;
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    delivered += 1;
                    match self.handle_event(event).await {
                        Ok(EventDisposition::Advance(revision)) => cursor.advance(revision),
                        Ok(EventDisposition::Stay) => {}
                        Ok(EventDisposition::Expired) => {
                            cursor.reset();
                            break;
                        }
                        // Cursor stays put so the event is redelivered on
                        // the next subscription attempt
                        Err(err) => error!("Error handling event: {}", err),
                    }
                }
                Err(ClusterError::CursorExpired(message)) => {
                    warn!("Watch cursor expired mid-stream: {}", message);
                    cursor.reset();
                    break;
                }
                Err(err) => {
                    error!("WarmImage watch stream error: {}", err);
                    break;
                }
            }
        }
        (cursor, delivered)
    }

    /// Applies a single watch event through the reconciler.
    pub(crate) async fn handle_event(
        &self,
        event: WatchEvent<WarmImage>,
    ) -> Result<EventDisposition, ControllerError> {
        match event {
            WatchEvent::Added(resource) | WatchEvent::Modified(resource) => {
                let revision = Self::revision(&resource)?;
                self.reconciler.reconcile(&resource).await?;
                Ok(EventDisposition::Advance(revision))
            }
            WatchEvent::Deleted(resource) => {
                let revision = Self::revision(&resource)?;
                self.reconciler.teardown(&resource).await?;
                Ok(EventDisposition::Advance(revision))
            }
            WatchEvent::Bookmark(bookmark) => {
                let revision = bookmark.metadata.resource_version;
                if revision.is_empty() {
                    Ok(EventDisposition::Stay)
                } else {
                    Ok(EventDisposition::Advance(revision))
                }
            }
            WatchEvent::Error(response) if response.code == 410 => {
                warn!("Watch cursor rejected by the platform: {}", response.message);
                Ok(EventDisposition::Expired)
            }
            WatchEvent::Error(response) => {
                error!("WarmImage watch returned error event: {}", response.message);
                Ok(EventDisposition::Stay)
            }
        }
    }

    fn revision(resource: &WarmImage) -> Result<String, ControllerError> {
        resource.metadata.resource_version.clone().ok_or_else(|| {
            ControllerError::InvalidResource(
                "WarmImage missing metadata.resourceVersion".to_string(),
            )
        })
    }
}
