//! Point-to-point message envelopes for the message channel.

use serde::{Deserialize, Serialize};

use crate::{SyncError, REQUEST_PATH};

/// A fire-and-forget message between two specific peers.
///
/// Delivery is unacknowledged and may silently fail; nothing in the protocol
/// depends on an envelope arriving. The only envelope currently in use is
/// the companion's refresh request, whose optional payload is an 8-byte
/// big-endian timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// The path this message is addressed to (e.g. `/weather-request`).
    pub path: String,
    /// Optional fixed-size binary payload.
    pub payload: Option<Vec<u8>>,
}

impl MessageEnvelope {
    /// Create an envelope with no payload.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            payload: None,
        }
    }

    /// Create a refresh request carrying the given timestamp.
    pub fn refresh_request(timestamp: i64) -> Self {
        Self {
            path: REQUEST_PATH.to_string(),
            payload: Some(timestamp.to_be_bytes().to_vec()),
        }
    }

    /// Decode the embedded big-endian timestamp.
    ///
    /// A missing or wrong-length payload is not an error; it decodes to 0.
    /// The value is reserved; receivers log it but do not act on it.
    pub fn timestamp(&self) -> i64 {
        match &self.payload {
            Some(bytes) if bytes.len() >= 8 => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes[..8]);
                i64::from_be_bytes(arr)
            }
            _ => 0,
        }
    }

    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        rmp_serde::to_vec(self).map_err(SyncError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SyncError> {
        rmp_serde::from_slice(bytes).map_err(SyncError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_carries_timestamp() {
        let envelope = MessageEnvelope::refresh_request(1705000000);
        assert_eq!(envelope.path, REQUEST_PATH);
        assert_eq!(envelope.timestamp(), 1705000000);
    }

    #[test]
    fn missing_payload_decodes_to_zero() {
        let envelope = MessageEnvelope::new(REQUEST_PATH);
        assert_eq!(envelope.timestamp(), 0);
    }

    #[test]
    fn short_payload_decodes_to_zero() {
        let envelope = MessageEnvelope {
            path: REQUEST_PATH.to_string(),
            payload: Some(vec![1, 2, 3]),
        };
        assert_eq!(envelope.timestamp(), 0);
    }

    #[test]
    fn timestamp_is_big_endian() {
        let envelope = MessageEnvelope {
            path: REQUEST_PATH.to_string(),
            payload: Some(vec![0, 0, 0, 0, 0, 0, 0, 1]),
        };
        assert_eq!(envelope.timestamp(), 1);
    }

    #[test]
    fn negative_timestamp_roundtrips() {
        let envelope = MessageEnvelope::refresh_request(-1);
        assert_eq!(envelope.timestamp(), -1);
    }

    #[test]
    fn envelope_roundtrip() {
        let envelope = MessageEnvelope::refresh_request(99);
        let bytes = envelope.to_bytes().unwrap();
        let restored = MessageEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(envelope, restored);
    }
}
