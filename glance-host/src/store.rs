//! The external weather store interface.
//!
//! The store's schema and its network fetch live out of process; the host
//! only needs a date-ordered forecast query and a resync trigger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Weather store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The forecast query failed.
    #[error("forecast query failed: {0}")]
    Query(String),

    /// The resync trigger could not be issued.
    #[error("resync trigger failed: {0}")]
    Resync(String),
}

/// One forecast row as the store exposes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    /// Forecast date in epoch milliseconds.
    pub date: i64,
    /// Maximum temperature, as stored (floating point).
    pub max_temp: f64,
    /// Minimum temperature, as stored (floating point).
    pub min_temp: f64,
    /// Weather condition code.
    pub condition_id: i32,
}

/// Narrow query/trigger interface over the external weather store.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Forecast rows with `date >= start_date`, ascending by date.
    async fn forecast_from(&self, start_date: i64) -> Result<Vec<ForecastRow>, StoreError>;

    /// Ask the store to repopulate itself, out of process. Fire-and-forget:
    /// there is no completion signal for the caller to consume.
    async fn request_resync(&self, manual: bool, expedited: bool) -> Result<(), StoreError>;
}

/// In-memory store for tests and the demo binary.
#[derive(Default)]
pub struct MemoryWeatherStore {
    rows: Mutex<Vec<ForecastRow>>,
    resync_calls: AtomicUsize,
    last_resync_flags: Mutex<Option<(bool, bool)>>,
}

impl MemoryWeatherStore {
    /// Create an empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given rows.
    pub fn with_rows(rows: Vec<ForecastRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Add a forecast row.
    pub fn insert_row(&self, row: ForecastRow) {
        self.rows.lock().expect("store lock poisoned").push(row);
    }

    /// How many resync triggers have been issued.
    pub fn resync_count(&self) -> usize {
        self.resync_calls.load(Ordering::SeqCst)
    }

    /// The (manual, expedited) flags of the most recent resync trigger.
    pub fn last_resync_flags(&self) -> Option<(bool, bool)> {
        *self.last_resync_flags.lock().expect("store lock poisoned")
    }
}

#[async_trait]
impl WeatherStore for MemoryWeatherStore {
    async fn forecast_from(&self, start_date: i64) -> Result<Vec<ForecastRow>, StoreError> {
        let mut rows: Vec<ForecastRow> = self
            .rows
            .lock()
            .expect("store lock poisoned")
            .iter()
            .filter(|row| row.date >= start_date)
            .copied()
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    async fn request_resync(&self, manual: bool, expedited: bool) -> Result<(), StoreError> {
        self.resync_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_resync_flags.lock().expect("store lock poisoned") =
            Some((manual, expedited));
        Ok(())
    }
}
