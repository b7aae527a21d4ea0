//! One-shot tick timer with explicit cancellation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Schedules at most one pending tick at a time.
///
/// Every `schedule` cancels the previous tick first. Cancellation bumps a
/// generation counter in addition to aborting the sleeper task, so a tick
/// that was already past its sleep when the cancel landed is still dropped
/// at the send check. Fired ticks arrive on the receiver returned by
/// [`TickScheduler::new`].
pub struct TickScheduler {
    tick_tx: mpsc::UnboundedSender<()>,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TickScheduler {
    /// Create a scheduler and the receiver its ticks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        (
            Self {
                tick_tx,
                generation: Arc::new(AtomicU64::new(0)),
                pending: Mutex::new(None),
            },
            tick_rx,
        )
    }

    /// Schedule a tick after `delay_ms`, replacing any pending tick.
    pub fn schedule(&self, delay_ms: u64) {
        self.cancel();

        let armed = self.generation.load(Ordering::SeqCst);
        let generation = self.generation.clone();
        let tick_tx = self.tick_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // A cancel since arming invalidates this tick.
            if generation.load(Ordering::SeqCst) == armed {
                let _ = tick_tx.send(());
            }
        });
        *self.pending.lock().expect("scheduler lock poisoned") = Some(handle);
    }

    /// Cancel the pending tick, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self
            .pending
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Whether a scheduled tick has not yet fired or been cancelled.
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .expect("scheduler lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
