//! The refresh request handler.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use glance_platform::DataChannel;
use glance_types::{MessageEnvelope, WeatherSnapshot, REQUEST_PATH};

use crate::store::{StoreError, WeatherStore};

/// Host-side errors.
#[derive(Debug, Error)]
pub enum HostError {
    /// The weather store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Answers companion refresh requests from the weather store.
///
/// Constructed once at process start and passed to whoever runs the serve
/// loop; there is no process-wide singleton.
pub struct SyncRequestHandler<S, D> {
    store: Arc<S>,
    data: Arc<D>,
    clock: fn() -> i64,
}

impl<S, D> SyncRequestHandler<S, D>
where
    S: WeatherStore + 'static,
    D: DataChannel + 'static,
{
    /// Create a handler over the given store and data channel.
    pub fn new(store: Arc<S>, data: Arc<D>) -> Self {
        Self {
            store,
            data,
            clock: now_ms,
        }
    }

    /// Create a handler with a fixed clock, for tests.
    pub fn with_clock(store: Arc<S>, data: Arc<D>, clock: fn() -> i64) -> Self {
        Self { store, data, clock }
    }

    /// Handle one refresh request.
    ///
    /// The embedded timestamp is decoded tolerantly (wrong length reads as
    /// 0) and echoed back in the published payload; the host takes no other
    /// action on it. When the store has no row for today, one resync
    /// trigger is issued and nothing is published - a later request retries
    /// the query.
    pub async fn handle_request(&self, envelope: MessageEnvelope) -> Result<(), HostError> {
        let requested_at = envelope.timestamp();
        tracing::trace!(requested_at, "decoding refresh request");

        let today = (self.clock)();
        let rows = self.store.forecast_from(today).await?;

        match rows.first() {
            Some(row) => {
                tracing::debug!(
                    condition_id = row.condition_id,
                    "forecast row exists, sending data to companion"
                );
                // Store temperatures are floats; the companion displays
                // whole degrees, truncated.
                self.publish_snapshot(
                    row.max_temp as i32,
                    row.min_temp as i32,
                    row.condition_id,
                    requested_at,
                )
                .await;
                Ok(())
            }
            None => {
                tracing::debug!("no forecast row, requesting store resync");
                self.store.request_resync(true, true).await?;
                Ok(())
            }
        }
    }

    /// Publish a snapshot at the well-known weather path.
    ///
    /// The publish result is observed only for logging; a failure is not
    /// retried and the companion keeps its last cached value. Also serves
    /// as the out-of-band entry point for a sync-completion hook to push
    /// fresh data without an incoming request.
    pub async fn publish_snapshot(
        &self,
        high_temp: i32,
        low_temp: i32,
        condition_code: i32,
        observed_at: i64,
    ) {
        let snapshot = WeatherSnapshot {
            high_temp,
            low_temp,
            condition_code,
            observed_at,
        };
        match self.data.publish(snapshot.to_payload()).await {
            Ok(()) => tracing::info!("successfully sent snapshot to companion"),
            Err(e) => tracing::warn!("couldn't send snapshot to companion: {}", e),
        }
    }

    /// Consume incoming envelopes, handing each request to a worker task so
    /// delivery is never blocked on the store query.
    pub async fn serve(self: Arc<Self>, mut incoming: mpsc::UnboundedReceiver<MessageEnvelope>)
    where
        S: Send + Sync,
        D: Send + Sync,
    {
        while let Some(envelope) = incoming.recv().await {
            if envelope.path != REQUEST_PATH {
                tracing::debug!(path = %envelope.path, "ignoring message for unhandled path");
                continue;
            }
            tracing::debug!("received data request");

            let handler = self.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.handle_request(envelope).await {
                    tracing::warn!("request handler error: {}", e);
                }
            });
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
