//! # glance-types
//!
//! Wire format types for the glance-sync host/companion protocol.
//!
//! This crate provides the foundational types used across all glance-sync
//! crates:
//! - [`PeerId`] - Identity of a device on the peer link
//! - [`DataPayload`], [`FieldValue`] - Path-addressed key/value items
//!   replicated over the data channel
//! - [`MessageEnvelope`] - Fire-and-forget point-to-point messages
//! - [`WeatherSnapshot`] - The weather summary the host publishes
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod payload;
mod peer;
mod snapshot;

pub use envelope::MessageEnvelope;
pub use error::SyncError;
pub use payload::{DataPayload, FieldValue};
pub use peer::PeerId;
pub use snapshot::WeatherSnapshot;

/// Data channel path for the replicated weather summary.
pub const WEATHER_PATH: &str = "/sunshine";

/// Message channel path for companion-to-host refresh requests.
pub const REQUEST_PATH: &str = "/weather-request";

/// Field key for the high temperature (int).
pub const HIGH_TEMP_KEY: &str = "HIGH_TEMP";

/// Field key for the low temperature (int).
pub const LOW_TEMP_KEY: &str = "LOW_TEMP";

/// Field key for the weather condition code (int).
pub const WEATHER_ID_KEY: &str = "WEATHER_ID";

/// Field key for the observation timestamp (long).
pub const TIMESTAMP_KEY: &str = "timestamp";
