//! Companion-side snapshot cache with partial-merge semantics.

use glance_types::{
    DataPayload, WeatherSnapshot, HIGH_TEMP_KEY, LOW_TEMP_KEY, TIMESTAMP_KEY, WEATHER_ID_KEY,
    WEATHER_PATH,
};

/// The companion's merged view of every weather payload delivered so far.
///
/// Each incoming [`DataPayload`] overwrites only the fields it carries;
/// absent keys keep their cached value. There is no clear operation - the
/// merge is cumulative for the life of the engine. Applying the same payload
/// twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotCache {
    high_temp: i32,
    low_temp: i32,
    condition_code: i32,
    observed_at: i64,
}

impl SnapshotCache {
    /// Create a cache with the pre-sync placeholder values shown until the
    /// first payload arrives.
    pub fn new() -> Self {
        Self {
            high_temp: 41,
            low_temp: 37,
            condition_code: 0,
            observed_at: 0,
        }
    }

    /// Merge a payload into the cache, field by field.
    ///
    /// Payloads for other paths are ignored. Returns `true` if any cached
    /// field changed (callers use this to decide whether a redraw is due).
    pub fn apply(&mut self, payload: &DataPayload) -> bool {
        if payload.path != WEATHER_PATH {
            return false;
        }

        let before = *self;
        if let Some(high) = payload.int(HIGH_TEMP_KEY) {
            self.high_temp = high;
        }
        if let Some(low) = payload.int(LOW_TEMP_KEY) {
            self.low_temp = low;
        }
        if let Some(condition) = payload.int(WEATHER_ID_KEY) {
            self.condition_code = condition;
        }
        if let Some(observed_at) = payload.long(TIMESTAMP_KEY) {
            self.observed_at = observed_at;
        }
        *self != before
    }

    /// The current merged snapshot.
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            high_temp: self.high_temp,
            low_temp: self.low_temp,
            condition_code: self.condition_code,
            observed_at: self.observed_at,
        }
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_types::DataPayload;

    fn full_payload() -> DataPayload {
        DataPayload::new(WEATHER_PATH)
            .put_int(HIGH_TEMP_KEY, 75)
            .put_int(LOW_TEMP_KEY, 52)
            .put_int(WEATHER_ID_KEY, 800)
            .put_long(TIMESTAMP_KEY, 1705000000)
    }

    #[test]
    fn starts_with_placeholder_values() {
        let cache = SnapshotCache::new();
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.high_temp, 41);
        assert_eq!(snapshot.low_temp, 37);
        assert_eq!(snapshot.condition_code, 0);
    }

    #[test]
    fn full_payload_overwrites_all_fields() {
        let mut cache = SnapshotCache::new();
        assert!(cache.apply(&full_payload()));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.high_temp, 75);
        assert_eq!(snapshot.low_temp, 52);
        assert_eq!(snapshot.condition_code, 800);
        assert_eq!(snapshot.observed_at, 1705000000);
    }

    #[test]
    fn apply_is_idempotent() {
        let mut once = SnapshotCache::new();
        once.apply(&full_payload());

        let mut twice = SnapshotCache::new();
        twice.apply(&full_payload());
        let changed = twice.apply(&full_payload());

        assert!(!changed, "re-applying an identical payload changes nothing");
        assert_eq!(once, twice);
    }

    #[test]
    fn subset_payload_leaves_other_keys_untouched() {
        let mut cache = SnapshotCache::new();
        cache.apply(&full_payload());

        let partial = DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 80);
        assert!(cache.apply(&partial));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.high_temp, 80);
        assert_eq!(snapshot.low_temp, 52, "absent key must not be erased");
        assert_eq!(snapshot.condition_code, 800);
        assert_eq!(snapshot.observed_at, 1705000000);
    }

    #[test]
    fn wrong_path_is_ignored() {
        let mut cache = SnapshotCache::new();
        let other = DataPayload::new("/other").put_int(HIGH_TEMP_KEY, 99);

        assert!(!cache.apply(&other));
        assert_eq!(cache.snapshot().high_temp, 41);
    }

    #[test]
    fn cache_equals_merge_of_all_deliveries() {
        // The invariant: the cache is the field-wise merge of every payload
        // delivered, in order, regardless of which keys each one carried.
        let mut cache = SnapshotCache::new();
        cache.apply(&DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 60));
        cache.apply(&DataPayload::new(WEATHER_PATH).put_int(LOW_TEMP_KEY, 40));
        cache.apply(&DataPayload::new(WEATHER_PATH).put_int(HIGH_TEMP_KEY, 62));
        cache.apply(&DataPayload::new(WEATHER_PATH).put_int(WEATHER_ID_KEY, 500));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.high_temp, 62);
        assert_eq!(snapshot.low_temp, 40);
        assert_eq!(snapshot.condition_code, 500);
    }
}
