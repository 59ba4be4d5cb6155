use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sensor::SensorReading;

pub const DASHBOARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not a JSON object: {0}")]
    Malformed(String),
    #[error("missing '{0}' in JSON payload")]
    MissingField(&'static str),
    #[error("'{0}' must be a number")]
    NotANumber(&'static str),
}

/// What the dashboard currently shows.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LatestData {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
}

/// Consumer of readings, keeping only the latest one together with the last error.
#[derive(Clone, Debug, Default)]
pub struct Dashboard {
    latest: LatestData,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> &LatestData {
        &self.latest
    }

    /// Accepts a `{"temperature": .., "humidity": ..}` body.
    ///
    /// A rejected body leaves the previous values in place and records the error.
    pub fn receive_json(&mut self, body: &str, now: DateTime<Local>) -> Result<(), PayloadError> {
        match parse_payload(body) {
            Ok(reading) => {
                self.record(reading, now);
                Ok(())
            }
            Err(err) => {
                log::warn!("Rejected payload: {err}");
                self.latest.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn record(&mut self, reading: SensorReading, now: DateTime<Local>) {
        self.latest.temperature = Some(reading.temperature_celsius);
        self.latest.humidity = Some(reading.humidity_percent);
        self.latest.timestamp = Some(now.format(DASHBOARD_TIME_FORMAT).to_string());
        self.latest.error = None;
    }

    pub fn render(&self) -> Vec<String> {
        let latest = &self.latest;

        if let Some(error) = &latest.error {
            return vec![format!("Error receiving data: {error}")];
        }

        match (latest.temperature, latest.humidity) {
            (Some(temperature), Some(humidity)) => {
                let mut lines = vec![
                    format!("Temperature: {temperature:.1} °C"),
                    format!("Humidity: {humidity:.1} %"),
                ];
                if let Some(timestamp) = &latest.timestamp {
                    lines.push(format!("Last updated: {timestamp}"));
                }
                lines
            }
            _ => vec!["Waiting for data...".to_string()],
        }
    }
}

fn parse_payload(body: &str) -> Result<SensorReading, PayloadError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| PayloadError::Malformed(err.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| PayloadError::Malformed("expected an object".to_string()))?;

    let number = |key: &'static str| -> Result<f64, PayloadError> {
        object
            .get(key)
            .ok_or(PayloadError::MissingField(key))?
            .as_f64()
            .ok_or(PayloadError::NotANumber(key))
    };

    Ok(SensorReading {
        temperature_celsius: number("temperature")?,
        humidity_percent: number("humidity")?,
    })
}
