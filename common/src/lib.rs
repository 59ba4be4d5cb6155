pub mod clock;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod sensor;
pub mod ticker;
pub mod updater;

pub use clock::{Clock, LocalClock};
pub use config::{ConfigError, SimulatorConfig};
pub use dashboard::{Dashboard, LatestData, PayloadError};
pub use display::{DisplayError, DisplaySurface, InMemoryPage, SharedPage};
pub use sensor::{SensorReading, SensorSimulator};
pub use ticker::{Ticker, TickerError};
pub use updater::{SensorUpdater, UpdateError};

/// Convenience helper for sharing the latest of a value between the component writing it and
/// anyone reading it. For example the updater storing a reading and the UI rendering it.
///
/// Only one value is kept: `set` overwrites, nothing is queued.
#[derive(Debug)]
pub struct ValueStore<T>(std::sync::Arc<std::sync::Mutex<Option<T>>>);

impl<T> Clone for ValueStore<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for ValueStore<T> {
    fn default() -> Self {
        Self(Default::default())
    }
}

impl<T: Clone> ValueStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `value` as the last value, discarding the previous one.
    pub fn set(&self, value: T) {
        let mut data = self.lock();
        let _ = data.insert(value);
    }

    /// Returns a copy of the stored value, leaving it in place.
    pub fn latest(&self) -> Option<T> {
        self.lock().clone()
    }

    // The value is plain data, a panic while holding the lock cannot leave it half-written.
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
