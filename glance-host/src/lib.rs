//! # glance-host
//!
//! Host-side refresh handling for glance-sync.
//!
//! The host holds the authoritative weather store. When the companion sends
//! a refresh request, the [`SyncRequestHandler`]:
//! - queries the store for the first forecast row from "today",
//! - publishes a [`WeatherSnapshot`](glance_types::WeatherSnapshot) on the
//!   data channel if a row exists, or
//! - fires the store's out-of-process resync trigger if nothing is there.
//!
//! Neither path blocks the message delivery loop: each request is handed to
//! a worker task. Publish failures are logged and never retried; the
//! companion simply keeps showing its last cached value.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod handler;
mod store;

pub use handler::{HostError, SyncRequestHandler};
pub use store::{ForecastRow, MemoryWeatherStore, StoreError, WeatherStore};
