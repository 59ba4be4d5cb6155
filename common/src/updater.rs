use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::clock::{Clock, LocalClock};
use crate::config::SimulatorConfig;
use crate::display::{DisplayError, DisplaySurface};
use crate::sensor::{SensorReading, SensorSimulator};
use crate::ValueStore;

pub const TIMESTAMP_PREFIX: &str = "Last updated: ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    #[error("display element `{0}` is missing")]
    MissingTarget(String),
    #[error("`{0}` is not a usable time format")]
    TimeFormat(String),
}

impl From<DisplayError> for UpdateError {
    fn from(err: DisplayError) -> Self {
        match err {
            DisplayError::MissingTarget(id) => Self::MissingTarget(id),
        }
    }
}

/// Renders `Last updated: <time>` for the given capture instant.
pub fn format_timestamp_line(
    time: &DateTime<Local>,
    time_format: &str,
) -> Result<String, UpdateError> {
    let mut line = String::from(TIMESTAMP_PREFIX);
    write!(line, "{}", time.format(time_format))
        .map_err(|_| UpdateError::TimeFormat(time_format.to_string()))?;
    Ok(line)
}

/// Samples a new reading, stores it and stamps the display on every call.
pub struct SensorUpdater<D, C = LocalClock> {
    simulator: SensorSimulator,
    store: ValueStore<SensorReading>,
    display: D,
    clock: C,
    target_id: String,
    time_format: String,
    invocations: u64,
}

impl<D: DisplaySurface> SensorUpdater<D, LocalClock> {
    /// An updater writing to `display` with the settings of `config`.
    pub fn from_config(config: &SimulatorConfig, display: D) -> Self {
        let simulator = match config.seed {
            Some(seed) => SensorSimulator::from_seed(seed),
            None => SensorSimulator::from_entropy(),
        };

        Self::new(
            simulator,
            ValueStore::new(),
            display,
            LocalClock,
            config.target_id.clone(),
            config.time_format.clone(),
        )
    }
}

impl<D: DisplaySurface, C: Clock> SensorUpdater<D, C> {
    pub fn new(
        simulator: SensorSimulator,
        store: ValueStore<SensorReading>,
        display: D,
        clock: C,
        target_id: impl Into<String>,
        time_format: impl Into<String>,
    ) -> Self {
        Self {
            simulator,
            store,
            display,
            clock,
            target_id: target_id.into(),
            time_format: time_format.into(),
            invocations: 0,
        }
    }

    /// Runs one tick.
    ///
    /// The reading is stored before the display is touched, so it is current even when the
    /// display element is missing and this returns [`UpdateError::MissingTarget`].
    pub fn update(&mut self) -> Result<SensorReading, UpdateError> {
        self.invocations += 1;

        let reading = self.simulator.sample();
        self.store.set(reading);

        let line = format_timestamp_line(&self.clock.now(), &self.time_format)?;
        self.display.set_text(&self.target_id, &line)?;

        log::debug!("Tick {}: {reading:?}", self.invocations);
        Ok(reading)
    }

    /// Number of `update` calls so far, failed ones included.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    pub fn store(&self) -> &ValueStore<SensorReading> {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}
