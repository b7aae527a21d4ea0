//! # glance-core
//!
//! Pure logic for glance-sync (no I/O, instant tests).
//!
//! This crate implements the state machines and algorithms for the
//! host/companion sync without any network or timer I/O, enabling fast
//! unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (peer link, tick timers, drawing) is performed by
//! `glance-platform` and `glance-companion`, which interpret the actions
//! produced by these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod icons;
pub mod link;
pub mod render;

pub use cache::SnapshotCache;
pub use icons::{icon_for, Icon};
pub use link::{LinkAction, LinkEvent, LinkState};
pub use render::{
    next_tick_delay, RenderAction, RenderEvent, RenderPhase, RenderState, TapPhase,
    INTERACTIVE_UPDATE_RATE_MS,
};
