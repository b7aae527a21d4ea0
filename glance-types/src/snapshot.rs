//! The weather summary the host publishes.

use serde::{Deserialize, Serialize};

use crate::{
    DataPayload, HIGH_TEMP_KEY, LOW_TEMP_KEY, TIMESTAMP_KEY, WEATHER_ID_KEY, WEATHER_PATH,
};

/// A weather summary produced by the host and consumed by the companion.
///
/// Immutable once published; a later publish merges into the companion's
/// cached copy field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// High temperature for the day, already truncated to whole degrees.
    pub high_temp: i32,
    /// Low temperature for the day, already truncated to whole degrees.
    pub low_temp: i32,
    /// Weather condition code (OpenWeatherMap numbering).
    pub condition_code: i32,
    /// When the underlying observation was made, in epoch milliseconds.
    pub observed_at: i64,
}

impl WeatherSnapshot {
    /// Convert into a data channel payload at the well-known weather path.
    pub fn to_payload(&self) -> DataPayload {
        DataPayload::new(WEATHER_PATH)
            .put_int(HIGH_TEMP_KEY, self.high_temp)
            .put_int(LOW_TEMP_KEY, self.low_temp)
            .put_int(WEATHER_ID_KEY, self.condition_code)
            .put_long(TIMESTAMP_KEY, self.observed_at)
    }
}
