//! Connection manager: drives the pure link state machine against a
//! [`PeerService`].

use std::sync::{Arc, Mutex};

use glance_core::{LinkAction, LinkEvent, LinkState};

use crate::channel::{LinkSignal, PeerService, PlatformError};

/// Owns the lifecycle of one peer link.
///
/// State transitions live in `glance-core::link`; this type interprets the
/// actions the machine emits and performs the platform I/O. Signal handling
/// returns the catch-up actions (peer query, initial fetch) to the owner,
/// who knows how to execute them.
pub struct ConnectionManager<N> {
    node: Arc<N>,
    state: Mutex<LinkState>,
}

impl<N: PeerService> ConnectionManager<N> {
    /// Create a manager for the given endpoint, starting Disconnected.
    pub fn new(node: Arc<N>) -> Self {
        Self {
            node,
            state: Mutex::new(LinkState::new()),
        }
    }

    /// Current link state.
    pub fn state(&self) -> LinkState {
        *self.state.lock().expect("link state lock poisoned")
    }

    /// Request a connection. Idempotent while Connecting or Connected.
    ///
    /// There is no backoff: from Suspended or Failed this issues a fresh
    /// attempt immediately, which can overlap an earlier in-flight attempt
    /// when visibility flaps quickly. That is logged, not masked.
    pub async fn connect(&self) -> Result<(), PlatformError> {
        let previous = self.state();
        for action in self.dispatch(LinkEvent::ConnectRequested) {
            if matches!(action, LinkAction::Connect) {
                if matches!(previous, LinkState::Connecting) {
                    tracing::debug!("connect requested while an attempt may be in flight");
                }
                if let Err(e) = self.node.connect().await {
                    self.dispatch(LinkEvent::PlatformFailed {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Tear down the link.
    pub async fn disconnect(&self) {
        for action in self.dispatch(LinkEvent::DisconnectRequested) {
            if matches!(action, LinkAction::Disconnect) {
                self.node.disconnect().await;
            }
        }
    }

    /// Feed a platform signal through the state machine.
    ///
    /// Logging actions are consumed here; the remaining catch-up actions
    /// ([`LinkAction::QueryConnectedPeers`], [`LinkAction::FetchInitialState`])
    /// are returned for the owner to execute.
    pub fn on_signal(&self, signal: LinkSignal) -> Vec<LinkAction> {
        let event = match signal {
            LinkSignal::Connected => {
                tracing::debug!("link connected");
                LinkEvent::PlatformConnected
            }
            LinkSignal::Suspended => {
                tracing::warn!("link suspended; waiting for resume or explicit reconnect");
                LinkEvent::PlatformSuspended
            }
            LinkSignal::Failed(error) => LinkEvent::PlatformFailed { error },
        };

        self.dispatch(event)
            .into_iter()
            .filter(|action| match action {
                LinkAction::LogFailure { error } => {
                    tracing::error!(%error, "link connection failed");
                    false
                }
                _ => true,
            })
            .collect()
    }

    fn dispatch(&self, event: LinkEvent) -> Vec<LinkAction> {
        let mut state = self.state.lock().expect("link state lock poisoned");
        let (next, actions) = state.on_event(event);
        *state = next;
        actions
    }
}
