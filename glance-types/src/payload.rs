//! Path-addressed key/value payloads for the data channel.
//!
//! A [`DataPayload`] is the unit of replication: a path plus a map of typed
//! fields. The platform applies last-write-wins per key, so a payload that
//! carries only a subset of keys must never erase the keys it omits;
//! consumers merge field-wise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SyncError;

/// A typed field value inside a [`DataPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    /// 32-bit integer field.
    Int(i32),
    /// 64-bit integer field.
    Long(i64),
}

impl FieldValue {
    /// Get the value as an `i32`, if it is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Long(_) => None,
        }
    }

    /// Get the value as an `i64`, if it is a `Long`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Int(_) => None,
        }
    }
}

/// A path-addressed set of fields replicated over the data channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPayload {
    /// The path this payload belongs to (e.g. `/sunshine`).
    pub path: String,
    /// The fields carried by this payload.
    pub fields: BTreeMap<String, FieldValue>,
}

impl DataPayload {
    /// Create an empty payload for the given path.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Set an integer field.
    pub fn put_int(mut self, key: &str, value: i32) -> Self {
        self.fields.insert(key.to_string(), FieldValue::Int(value));
        self
    }

    /// Set a long field.
    pub fn put_long(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), FieldValue::Long(value));
        self
    }

    /// Get an integer field by key.
    pub fn int(&self, key: &str) -> Option<i32> {
        self.fields.get(key).and_then(FieldValue::as_int)
    }

    /// Get a long field by key.
    pub fn long(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(FieldValue::as_long)
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
    use crate::{HIGH_TEMP_KEY, LOW_TEMP_KEY, TIMESTAMP_KEY, WEATHER_PATH};

    #[test]
    fn payload_builder_sets_fields() {
        let payload = DataPayload::new(WEATHER_PATH)
            .put_int(HIGH_TEMP_KEY, 75)
            .put_int(LOW_TEMP_KEY, 52)
            .put_long(TIMESTAMP_KEY, 1705000000);

        assert_eq!(payload.int(HIGH_TEMP_KEY), Some(75));
        assert_eq!(payload.int(LOW_TEMP_KEY), Some(52));
        assert_eq!(payload.long(TIMESTAMP_KEY), Some(1705000000));
    }

    #[test]
    fn field_type_mismatch_returns_none() {
        let payload = DataPayload::new(WEATHER_PATH).put_long(TIMESTAMP_KEY, 7);
        assert_eq!(payload.int(TIMESTAMP_KEY), None);
        assert_eq!(payload.long(HIGH_TEMP_KEY), None);
    }

    #[test]
    fn payload_roundtrip() {
        let payload = DataPayload::new(WEATHER_PATH)
            .put_int(HIGH_TEMP_KEY, -3)
            .put_long(TIMESTAMP_KEY, 42);

        let bytes = payload.to_bytes().unwrap();
        let restored = DataPayload::from_bytes(&bytes).unwrap();

        assert_eq!(payload, restored);
    }

    #[test]
    fn malformed_bytes_fail_to_parse() {
        assert!(DataPayload::from_bytes(&[0xFF, 0x00, 0x01]).is_err());
    }
}
