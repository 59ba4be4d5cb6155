use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Linear mapping of a unit sample in [0, 1) onto `offset .. offset + span`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRange {
    pub offset: f64,
    pub span: f64,
}

impl SampleRange {
    pub const fn new(offset: f64, span: f64) -> Self {
        Self { offset, span }
    }

    pub fn min(&self) -> f64 {
        self.offset
    }

    pub fn max(&self) -> f64 {
        self.offset + self.span
    }

    /// Scales `unit` and rounds the result to one decimal place.
    pub fn scale(&self, unit: f64) -> f64 {
        round_to_tenth(unit * self.span + self.offset)
    }

    /// Both ends are inclusive, rounding can land a sample exactly on `max`.
    pub fn contains(&self, value: f64) -> bool {
        (self.min()..=self.max()).contains(&value)
    }
}

/// Temperature in °C, 15.0 ..= 45.0.
pub const TEMPERATURE_RANGE: SampleRange = SampleRange::new(15.0, 30.0);

/// Relative humidity in %, 20.0 ..= 80.0.
pub const HUMIDITY_RANGE: SampleRange = SampleRange::new(20.0, 60.0);

/// Rounds half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One simulated reading. Serializes to the payload the dashboard accepts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorReading {
    #[serde(rename = "temperature")]
    pub temperature_celsius: f64,
    #[serde(rename = "humidity")]
    pub humidity_percent: f64,
}

impl SensorReading {
    /// JSON body in the `{"temperature": .., "humidity": ..}` shape.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Draws readings from two independent uniform samples.
pub struct SensorSimulator {
    uniform: Uniform<f64>,
    rng: StdRng,
}

impl SensorSimulator {
    pub fn new(rng: StdRng) -> Self {
        Self {
            uniform: Uniform::new(0.0, 1.0),
            rng,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Same seed, same stream of readings.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn sample(&mut self) -> SensorReading {
        let temperature = self.uniform.sample(&mut self.rng);
        let humidity = self.uniform.sample(&mut self.rng);

        SensorReading {
            temperature_celsius: TEMPERATURE_RANGE.scale(temperature),
            humidity_percent: HUMIDITY_RANGE.scale(humidity),
        }
    }
}

#[cfg(test)]
pub(crate) fn has_one_decimal(value: f64) -> bool {
    let tenths = value * 10.0;
    (tenths - tenths.round()).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_follows_the_fixed_formulas() {
        assert_eq!(TEMPERATURE_RANGE.scale(0.0), 15.0);
        assert_eq!(TEMPERATURE_RANGE.scale(0.5), 30.0);
        assert_eq!(HUMIDITY_RANGE.scale(0.0), 20.0);
        assert_eq!(HUMIDITY_RANGE.scale(0.25), 35.0);
    }

    #[test]
    fn samples_just_below_one_round_onto_the_upper_bound() {
        let temperature = TEMPERATURE_RANGE.scale(0.999_999);
        let humidity = HUMIDITY_RANGE.scale(0.999_999);

        assert_eq!(temperature, 45.0);
        assert_eq!(humidity, 80.0);
        assert!(TEMPERATURE_RANGE.contains(temperature));
        assert!(HUMIDITY_RANGE.contains(humidity));
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_to_tenth(23.44), 23.4);
        assert_eq!(round_to_tenth(23.46), 23.5);
        assert_eq!(round_to_tenth(20.0), 20.0);
    }

    #[test]
    fn samples_stay_in_range_with_one_decimal() {
        let mut simulator = SensorSimulator::from_seed(7);

        for _ in 0..10_000 {
            let reading = simulator.sample();
            assert!(TEMPERATURE_RANGE.contains(reading.temperature_celsius), "{reading:?}");
            assert!(HUMIDITY_RANGE.contains(reading.humidity_percent), "{reading:?}");
            assert!(has_one_decimal(reading.temperature_celsius), "{reading:?}");
            assert!(has_one_decimal(reading.humidity_percent), "{reading:?}");
        }
    }

    #[test]
    fn readings_vary_between_draws() {
        let mut simulator = SensorSimulator::from_entropy();
        let readings: Vec<_> = (0..50).map(|_| simulator.sample()).collect();

        assert!(readings.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn equal_seeds_give_equal_streams() {
        let mut a = SensorSimulator::from_seed(42);
        let mut b = SensorSimulator::from_seed(42);

        for _ in 0..10 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn payload_uses_dashboard_field_names() {
        let reading = SensorReading {
            temperature_celsius: 21.5,
            humidity_percent: 40.0,
        };

        assert_eq!(
            reading.to_payload().unwrap(),
            r#"{"temperature":21.5,"humidity":40.0}"#
        );
    }
}
