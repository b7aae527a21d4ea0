//! In-process hub implementation for testing and demos.
//!
//! Two (or more) [`MemoryNode`] endpoints share a [`MemoryHub`]; published
//! items replicate through the hub with last-write-wins per key, messages
//! route point-to-point, and link signals are injectable so tests can force
//! suspensions and failures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

use glance_types::{DataPayload, FieldValue, MessageEnvelope, PeerId};

use crate::channel::{DataChannel, LinkSignal, MessageChannel, PeerService, PlatformError};

/// The shared in-process peer-sync service.
#[derive(Clone, Default)]
pub struct MemoryHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    /// Replicated items: path → merged field map (last write wins per key).
    items: DashMap<String, BTreeMap<String, FieldValue>>,
    endpoints: Mutex<Vec<Arc<EndpointInner>>>,
}

struct EndpointInner {
    id: PeerId,
    connected: AtomicBool,
    connect_attempts: AtomicU32,
    fail_next_connect: Mutex<Option<String>>,
    signals_tx: mpsc::UnboundedSender<LinkSignal>,
    signals_rx: Mutex<Option<mpsc::UnboundedReceiver<LinkSignal>>>,
    inbox_tx: mpsc::UnboundedSender<MessageEnvelope>,
    inbox_rx: Mutex<Option<mpsc::UnboundedReceiver<MessageEnvelope>>>,
    subscribers: Mutex<Vec<(String, mpsc::UnboundedSender<DataPayload>)>>,
}

impl MemoryHub {
    /// Create a new empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new endpoint attached to this hub.
    pub fn endpoint(&self) -> MemoryNode {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let endpoint = Arc::new(EndpointInner {
            id: PeerId::random(),
            connected: AtomicBool::new(false),
            connect_attempts: AtomicU32::new(0),
            fail_next_connect: Mutex::new(None),
            signals_tx,
            signals_rx: Mutex::new(Some(signals_rx)),
            inbox_tx,
            inbox_rx: Mutex::new(Some(inbox_rx)),
            subscribers: Mutex::new(Vec::new()),
        });
        self.inner
            .endpoints
            .lock()
            .expect("hub endpoint lock poisoned")
            .push(endpoint.clone());
        MemoryNode {
            hub: self.inner.clone(),
            inner: endpoint,
        }
    }
}

/// One endpoint on the in-process hub. Cloning shares state.
#[derive(Clone)]
pub struct MemoryNode {
    hub: Arc<HubInner>,
    inner: Arc<EndpointInner>,
}

impl MemoryNode {
    /// This endpoint's peer id.
    pub fn peer_id(&self) -> PeerId {
        self.inner.id
    }

    /// Whether the endpoint currently holds a live link.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// How many connect attempts the platform has seen.
    pub fn connect_attempts(&self) -> u32 {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }

    /// Cause the next `connect()` to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        *self
            .inner
            .fail_next_connect
            .lock()
            .expect("fault lock poisoned") = Some(error.to_string());
    }

    /// Suspend the link: deliveries pause and a `Suspended` signal fires.
    pub fn suspend(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
        let _ = self.inner.signals_tx.send(LinkSignal::Suspended);
    }

    /// Drop the link with a failure signal.
    pub fn fail_link(&self, error: &str) {
        self.inner.connected.store(false, Ordering::SeqCst);
        let _ = self
            .inner
            .signals_tx
            .send(LinkSignal::Failed(error.to_string()));
    }

    fn endpoints(&self) -> Vec<Arc<EndpointInner>> {
        self.hub
            .endpoints
            .lock()
            .expect("hub endpoint lock poisoned")
            .clone()
    }
}

#[async_trait]
impl PeerService for MemoryNode {
    async fn connect(&self) -> Result<(), PlatformError> {
        self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .inner
            .fail_next_connect
            .lock()
            .expect("fault lock poisoned")
            .take()
        {
            return Err(PlatformError::ConnectionFailed(error));
        }

        self.inner.connected.store(true, Ordering::SeqCst);
        let _ = self.inner.signals_tx.send(LinkSignal::Connected);
        Ok(())
    }

    async fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    fn take_signals(&self) -> Option<mpsc::UnboundedReceiver<LinkSignal>> {
        self.inner
            .signals_rx
            .lock()
            .expect("signal lock poisoned")
            .take()
    }

    async fn connected_peers(&self) -> Vec<PeerId> {
        self.endpoints()
            .iter()
            .filter(|e| e.id != self.inner.id && e.connected.load(Ordering::SeqCst))
            .map(|e| e.id)
            .collect()
    }
}

#[async_trait]
impl DataChannel for MemoryNode {
    async fn publish(&self, payload: DataPayload) -> Result<(), PlatformError> {
        if !self.is_connected() {
            return Err(PlatformError::NotConnected);
        }

        // Merge into the replicated store, last write wins per key.
        let mut item = self.hub.items.entry(payload.path.clone()).or_default();
        for (key, value) in &payload.fields {
            item.insert(key.clone(), *value);
        }
        drop(item);

        // Deliver the delta to every connected endpoint's subscribers.
        for endpoint in self.endpoints() {
            if !endpoint.connected.load(Ordering::SeqCst) {
                continue;
            }
            let mut subscribers = endpoint.subscribers.lock().expect("subscriber lock poisoned");
            subscribers.retain(|(path, tx)| {
                if *path != payload.path {
                    return true;
                }
                tx.send(payload.clone()).is_ok()
            });
        }

        Ok(())
    }

    async fn fetch_all(&self, path: &str) -> Result<Option<DataPayload>, PlatformError> {
        if !self.is_connected() {
            return Err(PlatformError::NotConnected);
        }

        Ok(self.hub.items.get(path).map(|item| DataPayload {
            path: path.to_string(),
            fields: item.clone(),
        }))
    }

    fn subscribe(&self, path: &str) -> mpsc::UnboundedReceiver<DataPayload> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push((path.to_string(), tx));
        rx
    }
}

#[async_trait]
impl MessageChannel for MemoryNode {
    async fn send(&self, peer: PeerId, envelope: MessageEnvelope) -> Result<(), PlatformError> {
        if !self.is_connected() {
            return Err(PlatformError::NotConnected);
        }

        // An unreachable peer is a silent no-op by contract.
        match self
            .endpoints()
            .iter()
            .find(|e| e.id == peer && e.connected.load(Ordering::SeqCst))
        {
            Some(endpoint) => {
                let _ = endpoint.inbox_tx.send(envelope);
            }
            None => {
                tracing::trace!(%peer, path = %envelope.path, "dropping message to unreachable peer");
            }
        }
        Ok(())
    }

    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<MessageEnvelope>> {
        self.inner
            .inbox_rx
            .lock()
            .expect("inbox lock poisoned")
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_types::{HIGH_TEMP_KEY, LOW_TEMP_KEY, REQUEST_PATH, WEATHER_PATH};

    async fn connected_pair() -> (MemoryNode, MemoryNode) {
        let hub = MemoryHub::new();
        let a = hub.endpoint();
        let b = hub.endpoint();
        a.connect().await.unwrap();
        b.connect().await.unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn publish_replicates_to_subscribers() {
        let (host, wear) = connected_pair().await;
        let mut updates = wear.subscribe(WEATHER_PATH);

        let payload = DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 75);
        host.publish(payload.clone()).await.unwrap();

        assert_eq!(updates.recv().await.unwrap(), payload);
    }

    #[tokio::test]
    async fn fetch_all_returns_cumulative_merge() {
        let (host, wear) = connected_pair().await;

        host.publish(DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 75))
            .await
            .unwrap();
        host.publish(DataPayload::new(WEATHER_PATH).put_int(LOW_TEMP_KEY, 52))
            .await
            .unwrap();
        // Overlapping key: last write wins.
        host.publish(DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 76))
            .await
            .unwrap();

        let item = wear.fetch_all(WEATHER_PATH).await.unwrap().unwrap();
        assert_eq!(item.int(HIGH_TEMP_KEY), Some(76));
        assert_eq!(item.int(LOW_TEMP_KEY), Some(52));
    }

    #[tokio::test]
    async fn fetch_all_of_unknown_path_is_none() {
        let (_, wear) = connected_pair().await;
        assert!(wear.fetch_all("/nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn publish_requires_connection() {
        let hub = MemoryHub::new();
        let node = hub.endpoint();

        let result = node
            .publish(DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 1))
            .await;
        assert!(matches!(result, Err(PlatformError::NotConnected)));
    }

    #[tokio::test]
    async fn disconnected_subscriber_misses_deltas_but_can_catch_up() {
        let (host, wear) = connected_pair().await;
        let mut updates = wear.subscribe(WEATHER_PATH);
        wear.disconnect().await;

        host.publish(DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 80))
            .await
            .unwrap();

        // No delta while disconnected.
        assert!(updates.try_recv().is_err());

        // Reconnect and fetch-all recovers the state.
        wear.connect().await.unwrap();
        let item = wear.fetch_all(WEATHER_PATH).await.unwrap().unwrap();
        assert_eq!(item.int(HIGH_TEMP_KEY), Some(80));
    }

    #[tokio::test]
    async fn send_routes_to_connected_peer() {
        let (host, wear) = connected_pair().await;
        let mut inbox = host.take_incoming().unwrap();

        wear.send(host.peer_id(), MessageEnvelope::refresh_request(7))
            .await
            .unwrap();

        let envelope = inbox.recv().await.unwrap();
        assert_eq!(envelope.path, REQUEST_PATH);
        assert_eq!(envelope.timestamp(), 7);
    }

    #[tokio::test]
    async fn send_to_unreachable_peer_is_silent_no_op() {
        let (host, wear) = connected_pair().await;
        host.disconnect().await;

        // No error, nothing delivered.
        wear.send(host.peer_id(), MessageEnvelope::refresh_request(1))
            .await
            .unwrap();

        let mut inbox = host.take_incoming().unwrap();
        assert!(inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_unknown_peer_is_silent_no_op() {
        let (_, wear) = connected_pair().await;
        wear.send(PeerId::random(), MessageEnvelope::refresh_request(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn connected_peers_sees_only_live_endpoints() {
        let hub = MemoryHub::new();
        let a = hub.endpoint();
        let b = hub.endpoint();

        a.connect().await.unwrap();
        assert!(a.connected_peers().await.is_empty());

        b.connect().await.unwrap();
        assert_eq!(a.connected_peers().await, vec![b.peer_id()]);

        b.disconnect().await;
        assert!(a.connected_peers().await.is_empty());
    }

    #[tokio::test]
    async fn forced_connect_failure() {
        let hub = MemoryHub::new();
        let node = hub.endpoint();
        node.fail_next_connect("service unavailable");

        let result = node.connect().await;
        assert!(matches!(result, Err(PlatformError::ConnectionFailed(_))));
        assert!(!node.is_connected());

        // Next attempt succeeds.
        node.connect().await.unwrap();
        assert!(node.is_connected());
    }

    #[tokio::test]
    async fn suspend_emits_signal_and_pauses_deliveries() {
        let (host, wear) = connected_pair().await;
        let mut signals = wear.take_signals().unwrap();
        // First signal is the Connected from setup.
        assert_eq!(signals.recv().await.unwrap(), LinkSignal::Connected);

        let mut updates = wear.subscribe(WEATHER_PATH);
        wear.suspend();
        assert_eq!(signals.recv().await.unwrap(), LinkSignal::Suspended);

        host.publish(DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 1))
            .await
            .unwrap();
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let hub = MemoryHub::new();
        let node = hub.endpoint();
        let clone = node.clone();

        node.connect().await.unwrap();
        assert!(clone.is_connected());
        assert_eq!(node.peer_id(), clone.peer_id());
    }
}
