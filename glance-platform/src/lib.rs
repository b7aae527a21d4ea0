//! # glance-platform
//!
//! Channel abstraction for the glance-sync peer link.
//!
//! This crate provides the pluggable seam between the host/companion logic
//! and whatever peer-sync service actually moves bytes between devices:
//!
//! - [`DataChannel`] - path-addressed, key/value, last-write-wins pub/sub
//! - [`MessageChannel`] - unacknowledged point-to-point sends
//! - [`PeerService`] - link lifecycle (connect/disconnect/signals)
//! - [`ConnectionManager`] - drives the pure link state machine from
//!   `glance-core` against a [`PeerService`]
//! - [`MemoryHub`] / [`MemoryNode`] - an in-process implementation with
//!   fault-injection hooks, used by tests and the demo binary

#![warn(missing_docs)]
#![warn(clippy::all)]

mod channel;
mod manager;
mod memory;

pub use channel::{DataChannel, LinkSignal, MessageChannel, PeerService, PlatformError};
pub use manager::ConnectionManager;
pub use memory::{MemoryHub, MemoryNode};
