//! Peer link state machine for glance-sync.
//!
//! This module provides a pure, side-effect-free state machine for the
//! lifecycle of the link to the platform peer-sync service. The machine
//! takes events as input and produces a new state plus a list of actions
//! to execute.
//!
//! The actual I/O (connecting, fetching state) is performed by
//! `glance-platform`, not by this module. This enables instant unit
//! testing without network mocks.
//!
//! There is deliberately no reconnect backoff: every `ConnectRequested`
//! issues a fresh attempt regardless of recent failures. Rapid
//! visible↔hidden cycling can therefore create overlapping in-flight
//! attempts; callers log that risk rather than masking it.

/// Peer link state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected to the peer-sync service.
    Disconnected,
    /// Connection attempt in progress.
    Connecting,
    /// Fully connected; data channel deliveries flow.
    Connected,
    /// The platform suspended the link; it may resume on its own.
    Suspended,
    /// The platform reported a failed connection attempt.
    Failed,
}

impl LinkState {
    /// Create a new state machine in the Disconnected state.
    pub fn new() -> Self {
        Self::Disconnected
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller
    /// (`ConnectionManager`) is responsible for executing the returned
    /// actions.
    pub fn on_event(self, event: LinkEvent) -> (Self, Vec<LinkAction>) {
        match (self, event) {
            // connect() is idempotent while an attempt is in flight or the
            // link is already up.
            (Self::Connecting, LinkEvent::ConnectRequested) => (Self::Connecting, vec![]),
            (Self::Connected, LinkEvent::ConnectRequested) => (Self::Connected, vec![]),

            // From any other state a connect is a fresh attempt: no backoff,
            // no bookkeeping of prior failures.
            (_, LinkEvent::ConnectRequested) => (Self::Connecting, vec![LinkAction::Connect]),

            // The platform answered. On first connect the consumer must
            // catch up on state published before its subscription existed,
            // then learn the peer id for refresh requests.
            (Self::Connecting | Self::Suspended, LinkEvent::PlatformConnected) => (
                Self::Connected,
                vec![LinkAction::QueryConnectedPeers, LinkAction::FetchInitialState],
            ),

            // Suspension is not an error and is not retried automatically;
            // the link either resumes or the owner calls connect() again.
            (Self::Connected, LinkEvent::PlatformSuspended) => (Self::Suspended, vec![]),

            // Failure from any state. Logged by the caller, never retried
            // automatically.
            (_, LinkEvent::PlatformFailed { error }) => {
                (Self::Failed, vec![LinkAction::LogFailure { error }])
            }

            (_, LinkEvent::DisconnectRequested) => {
                (Self::Disconnected, vec![LinkAction::Disconnect])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if a connection attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur in the link lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The owner requested a connection.
    ConnectRequested,
    /// The owner requested a disconnect.
    DisconnectRequested,
    /// The platform reported the link is up.
    PlatformConnected,
    /// The platform suspended the link.
    PlatformSuspended,
    /// The platform reported a failed connection.
    PlatformFailed {
        /// Error message describing the failure.
        error: String,
    },
}

/// Actions to be executed by the connection manager.
///
/// These are instructions, not side effects. The manager interprets them
/// and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Initiate a platform connection attempt.
    Connect,
    /// Tear down the platform connection.
    Disconnect,
    /// Query the currently connected peers (to learn the host's id).
    QueryConnectedPeers,
    /// Bulk-fetch the current data channel state to catch up.
    FetchInitialState,
    /// Record a link failure in the log.
    LogFailure {
        /// Error message describing the failure.
        error: String,
    },
}
