//! The render engine: interprets render-machine actions against the
//! platform, the tick scheduler, and the face surface.

use std::sync::Arc;

use tokio::sync::mpsc;

use glance_core::{
    icon_for, LinkAction, RenderAction, RenderEvent, RenderState, SnapshotCache,
};
use glance_platform::{
    ConnectionManager, DataChannel, LinkSignal, MessageChannel, PeerService,
};
use glance_types::{DataPayload, MessageEnvelope, PeerId, WEATHER_PATH};

use crate::face::{Face, FaceFrame};
use crate::scheduler::TickScheduler;

/// Handle for feeding lifecycle events into a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    events_tx: mpsc::UnboundedSender<RenderEvent>,
}

impl EngineHandle {
    /// Deliver a render event. A send after the engine has shut down is a
    /// no-op.
    pub fn event(&self, event: RenderEvent) {
        let _ = self.events_tx.send(event);
    }
}

/// Drives one face from the peer link.
///
/// All platform deliveries (link signals, data payloads, fired ticks) and
/// all lifecycle events funnel through a single event loop, so the cache,
/// the render state, and the face are only ever touched sequentially.
pub struct RenderEngine<N, F> {
    node: Arc<N>,
    manager: ConnectionManager<N>,
    face: F,
    state: RenderState,
    cache: SnapshotCache,
    scheduler: TickScheduler,
    ticks: Option<mpsc::UnboundedReceiver<()>>,
    events: Option<mpsc::UnboundedReceiver<RenderEvent>>,
    peer: Option<PeerId>,
    clock: fn() -> u64,
}

impl<N, F> RenderEngine<N, F>
where
    N: PeerService + DataChannel + MessageChannel + 'static,
    F: Face,
{
    /// Create an engine over the given endpoint and face, plus the handle
    /// used to feed it lifecycle events.
    pub fn new(node: Arc<N>, face: F) -> (Self, EngineHandle) {
        Self::with_clock(node, face, now_ms)
    }

    /// Create an engine with a fixed clock, for tests.
    pub fn with_clock(node: Arc<N>, face: F, clock: fn() -> u64) -> (Self, EngineHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (scheduler, tick_rx) = TickScheduler::new();
        let engine = Self {
            manager: ConnectionManager::new(node.clone()),
            node,
            face,
            state: RenderState::new(),
            cache: SnapshotCache::new(),
            scheduler,
            ticks: Some(tick_rx),
            events: Some(events_rx),
            peer: None,
            clock,
        };
        (engine, EngineHandle { events_tx })
    }

    /// The peer the engine will address refresh requests to, once learned.
    pub fn peer(&self) -> Option<PeerId> {
        self.peer
    }

    /// The current merged snapshot.
    pub fn snapshot(&self) -> glance_types::WeatherSnapshot {
        self.cache.snapshot()
    }

    /// Run the event loop until [`RenderEvent::Destroy`] is processed or
    /// every event source has closed.
    pub async fn run(mut self) {
        let Some(mut signals) = self.node.take_signals() else {
            tracing::error!("link signals already taken, engine cannot run");
            return;
        };
        let mut updates = self.node.subscribe(WEATHER_PATH);
        let (Some(mut ticks), Some(mut events)) = (self.ticks.take(), self.events.take()) else {
            tracing::error!("engine receivers already taken, engine cannot run");
            return;
        };

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let destroy = matches!(event, RenderEvent::Destroy);
                    self.dispatch(event).await;
                    if destroy {
                        tracing::debug!("engine destroyed, event loop ending");
                        break;
                    }
                }
                Some(()) = ticks.recv() => {
                    self.dispatch(RenderEvent::TickFired).await;
                }
                Some(signal) = signals.recv() => {
                    self.on_signal(signal).await;
                }
                Some(payload) = updates.recv() => {
                    self.on_payload(payload);
                }
                else => break,
            }
        }
    }

    /// Feed one event through the render machine and execute its actions.
    pub async fn dispatch(&mut self, event: RenderEvent) {
        let now = (self.clock)();
        for action in self.state.on_event(event, now) {
            self.execute(action).await;
        }
    }

    /// Feed one platform link signal through the connection manager and
    /// run the catch-up actions it returns.
    pub async fn on_signal(&mut self, signal: LinkSignal) {
        for action in self.manager.on_signal(signal) {
            match action {
                LinkAction::QueryConnectedPeers => self.learn_peer().await,
                LinkAction::FetchInitialState => self.fetch_initial_state().await,
                _ => {}
            }
        }
    }

    /// Merge one data payload into the cache, redrawing if anything
    /// changed.
    pub fn on_payload(&mut self, payload: DataPayload) {
        if self.cache.apply(&payload) {
            tracing::debug!("cached snapshot changed, redrawing");
            self.redraw();
        }
    }

    async fn execute(&mut self, action: RenderAction) {
        match action {
            RenderAction::RegisterEnvironmentListeners
            | RenderAction::UnregisterEnvironmentListeners
            | RenderAction::ResetTimeReference => {
                // Environment hooks are platform-specific; nothing to do on
                // this side of the seam.
                tracing::trace!(?action, "environment action acknowledged");
            }
            RenderAction::Connect => {
                if let Err(e) = self.manager.connect().await {
                    tracing::warn!("connect attempt failed: {}", e);
                }
            }
            RenderAction::Disconnect => self.manager.disconnect().await,
            RenderAction::SetAntialias(enabled) => {
                // Carried into every frame; the flag lives in the render
                // state.
                tracing::trace!(enabled, "antialias changed");
            }
            RenderAction::Redraw => self.redraw(),
            RenderAction::CancelTick => self.scheduler.cancel(),
            RenderAction::ScheduleTick { delay_ms } => self.scheduler.schedule(delay_ms),
            RenderAction::SendRefreshRequest => self.send_refresh_request().await,
        }
    }

    fn redraw(&mut self) {
        let snapshot = self.cache.snapshot();
        let frame = FaceFrame {
            icon: icon_for(snapshot.condition_code),
            snapshot,
            ambient: self.state.is_ambient(),
            antialias: self.state.antialias(),
            background_alternate: self.state.background_alternate(),
        };
        self.face.draw(&frame);
    }

    /// Learn the peer opportunistically: the first connected peer wins and
    /// is kept for the life of the engine.
    async fn learn_peer(&mut self) {
        if self.peer.is_some() {
            return;
        }
        self.peer = self.node.connected_peers().await.into_iter().next();
        match self.peer {
            Some(peer) => tracing::debug!(%peer, "learned peer"),
            None => tracing::debug!("no peers connected yet"),
        }
    }

    async fn fetch_initial_state(&mut self) {
        match self.node.fetch_all(WEATHER_PATH).await {
            Ok(Some(payload)) => self.on_payload(payload),
            Ok(None) => tracing::debug!("no published weather item yet"),
            Err(e) => tracing::warn!("initial state fetch failed: {}", e),
        }
    }

    async fn send_refresh_request(&mut self) {
        let Some(peer) = self.peer else {
            tracing::debug!("no known peer, refresh request dropped");
            return;
        };
        let envelope = MessageEnvelope::refresh_request(self.cache.snapshot().observed_at);
        if let Err(e) = self.node.send(peer, envelope).await {
            tracing::warn!("refresh request send failed: {}", e);
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
