//! Channel traits for the peer-sync service.
//!
//! # Design
//!
//! The traits are async and connection-oriented. Deliveries that the real
//! platform would hand to callbacks (data items, messages, link signals)
//! arrive here as `tokio::sync::mpsc` receivers, taken once by the owner of
//! the endpoint. None of the send-side operations carry timeouts: failures
//! surface through the signal receiver or not at all, and callers treat a
//! silently-dropped send as acceptable.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use glance_types::{DataPayload, MessageEnvelope, PeerId};

/// Platform channel errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Connection attempt failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint is not connected.
    #[error("not connected")]
    NotConnected,

    /// Publish failed.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Asynchronous notifications about the peer link, delivered on a platform
/// context distinct from whoever called `connect()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSignal {
    /// The link is up; data and message deliveries will flow.
    Connected,
    /// The platform suspended the link; it may resume on its own.
    Suspended,
    /// A connection attempt failed.
    Failed(String),
}

/// Lifecycle of the link to the peer-sync service.
#[async_trait]
pub trait PeerService: Send + Sync {
    /// Begin a connection attempt.
    ///
    /// Returning `Ok` means the attempt was issued, not that the link is
    /// up; completion arrives as a [`LinkSignal`] on the signal receiver.
    async fn connect(&self) -> Result<(), PlatformError>;

    /// Tear down the link.
    async fn disconnect(&self);

    /// Take the link signal receiver. Yields `None` after the first call.
    fn take_signals(&self) -> Option<mpsc::UnboundedReceiver<LinkSignal>>;

    /// The peers currently reachable over the link.
    async fn connected_peers(&self) -> Vec<PeerId>;
}

/// Path-addressed, key/value, last-write-wins pub/sub replicated between
/// peers by the platform.
#[async_trait]
pub trait DataChannel: Send + Sync {
    /// Publish a payload. Fire-and-forget: the platform guarantees eventual
    /// delivery to currently-connected peers, at-least-once per path, with
    /// last-write-wins on overlapping keys and no cross-path ordering.
    async fn publish(&self, payload: DataPayload) -> Result<(), PlatformError>;

    /// Fetch the current merged item at a path, to catch up on state
    /// published before this endpoint subscribed.
    async fn fetch_all(&self, path: &str) -> Result<Option<DataPayload>, PlatformError>;

    /// Subscribe to incremental payloads for a path. Deliveries occur only
    /// while the endpoint is connected.
    fn subscribe(&self, path: &str) -> mpsc::UnboundedReceiver<DataPayload>;
}

/// Unacknowledged point-to-point send primitive between two specific peers.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send an envelope to a peer. No ack, no retry, no ordering; the send
    /// silently evaporates if the peer is unreachable. Callers must not
    /// assume delivery.
    async fn send(&self, peer: PeerId, envelope: MessageEnvelope) -> Result<(), PlatformError>;

    /// Take the incoming envelope receiver. Yields `None` after the first
    /// call.
    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<MessageEnvelope>>;
}
