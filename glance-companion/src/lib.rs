//! # glance-companion
//!
//! Companion-side render engine for glance-sync.
//!
//! The companion displays the host's weather summary on a small
//! always-on-capable display. This crate owns the side effects around the
//! pure render machine in `glance-core`:
//!
//! - [`RenderEngine`] - single event loop consuming lifecycle events, link
//!   signals, data payloads, and fired ticks, and interpreting the machine's
//!   actions (connect, draw, schedule, send)
//! - [`TickScheduler`] - one pending tick at a time, generation-guarded
//!   cancellation
//! - [`Face`] / [`FaceFrame`] - the drawing seam, with a [`RecordingFace`]
//!   double for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod face;
mod scheduler;

pub use engine::{EngineHandle, RenderEngine};
pub use face::{Face, FaceFrame, RecordingFace};
pub use scheduler::TickScheduler;
