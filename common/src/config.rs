use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

pub const ENV_INTERVAL_MS: &str = "SENSOR_SIM_INTERVAL_MS";
pub const ENV_TARGET: &str = "SENSOR_SIM_TARGET";
pub const ENV_TIME_FORMAT: &str = "SENSOR_SIM_TIME_FORMAT";
pub const ENV_SEED: &str = "SENSOR_SIM_SEED";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value `{value}` for {key}")]
    Env { key: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_target_id() -> String {
    "timestamp".to_string()
}

fn default_time_format() -> String {
    "%H:%M:%S".to_string()
}

/// Runtime settings. The value ranges are fixed and deliberately absent here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Milliseconds between ticks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Identifier of the display element receiving the timestamp line.
    #[serde(default = "default_target_id")]
    pub target_id: String,

    /// chrono format string for the local time.
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Fixed RNG seed, entropy if unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            target_id: default_target_id(),
            time_format: default_time_format(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Parses a config layer. Call [`SimulatorConfig::validate`] once all layers are applied.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`, keyed by the `SENSOR_SIM_*` names.
    ///
    /// Values are only merged, a later layer may still fix an invalid one.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_INTERVAL_MS) {
            self.interval_ms = parse_env(ENV_INTERVAL_MS, value)?;
        }
        if let Some(value) = lookup(ENV_TARGET) {
            self.target_id = value;
        }
        if let Some(value) = lookup(ENV_TIME_FORMAT) {
            self.time_format = value;
        }
        if let Some(value) = lookup(ENV_SEED) {
            self.seed = Some(parse_env(ENV_SEED, value)?);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be greater than zero"));
        }
        if self.target_id.trim().is_empty() {
            return Err(ConfigError::Invalid("target_id must not be empty"));
        }
        if self.time_format.is_empty() {
            return Err(ConfigError::Invalid("time_format must not be empty"));
        }
        if StrftimeItems::new(&self.time_format).any(|item| item == Item::Error) {
            return Err(ConfigError::Invalid("time_format is not a valid strftime format"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn parse_env(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}
