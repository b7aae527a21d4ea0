//! Command implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use glance_companion::{Face, FaceFrame, RenderEngine};
use glance_core::{icon_for, RenderEvent, TapPhase};
use glance_host::{ForecastRow, MemoryWeatherStore, SyncRequestHandler};
use glance_platform::{MemoryHub, MessageChannel, PeerService};

use crate::config::DemoConfig;

/// Face that prints every frame it is asked to paint.
struct ConsoleFace;

impl Face for ConsoleFace {
    fn draw(&mut self, frame: &FaceFrame) {
        let icon = frame
            .icon
            .map(|icon| format!("{:?}", icon))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] {:>4}° / {:<4}°  {:<12} taps alternate: {}",
            if frame.ambient { "ambient" } else { "interactive" },
            frame.snapshot.high_temp,
            frame.snapshot.low_temp,
            icon,
            frame.background_alternate,
        );
    }
}

/// Run an in-process host and companion over the memory hub, simulating the
/// face becoming visible, the configured number of taps, and an ambient
/// round trip. With `no_data` the host store is left empty, so taps hit the
/// resync path and the face keeps its placeholder values.
pub async fn demo(config: DemoConfig, no_data: bool) -> Result<()> {
    let hub = MemoryHub::new();

    // Host side: seeded store plus the request handler loop.
    let host = Arc::new(hub.endpoint());
    host.connect().await?;
    let incoming = host
        .take_incoming()
        .context("host message receiver already taken")?;
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    let store = if no_data {
        Arc::new(MemoryWeatherStore::empty())
    } else {
        Arc::new(MemoryWeatherStore::with_rows(vec![ForecastRow {
            // Dated ahead so the row stays in range for the demo's lifetime.
            date: now + 60_000,
            max_temp: config.forecast.max_temp,
            min_temp: config.forecast.min_temp,
            condition_id: config.forecast.condition_id,
        }]))
    };
    let handler = Arc::new(SyncRequestHandler::new(store.clone(), host.clone()));
    tokio::spawn(handler.serve(incoming));

    // Companion side.
    let (engine, handle) = RenderEngine::new(Arc::new(hub.endpoint()), ConsoleFace);
    let engine_task = tokio::spawn(engine.run());

    tracing::info!(taps = config.taps, no_data, "starting demo");
    handle.event(RenderEvent::BecameVisible);
    tokio::time::sleep(Duration::from_millis(200)).await;

    for tap in 0..config.taps {
        tracing::debug!(tap, "simulating tap");
        handle.event(RenderEvent::Tap(TapPhase::TapComplete));
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    // Dip into ambient and back; the face redraws on the platform time tick
    // instead of the self-scheduled one.
    handle.event(RenderEvent::AmbientChanged(true));
    handle.event(RenderEvent::PlatformTimeTick);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.event(RenderEvent::AmbientChanged(false));
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.event(RenderEvent::Destroy);
    engine_task.await.context("engine task panicked")?;

    if no_data {
        println!("resync triggers issued: {}", store.resync_count());
    }
    println!("demo complete");
    Ok(())
}

/// Print the icon mapped to a weather condition code.
pub fn icon(code: i32) {
    match icon_for(code) {
        Some(icon) => println!("{} -> {:?}", code, icon),
        None => println!("{} -> (no icon)", code),
    }
}
