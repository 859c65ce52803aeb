//! Weather adjustment of the raw irradiance forecast
//!
//! Current ambient readings scale the baseline forecast. Their influence
//! decays with the forecast horizon, so late steps converge to the
//! unadjusted model output.

use serde::{Deserialize, Serialize};

/// Physical sanity ceiling for adjusted GHI (W/m²)
pub const MAX_GHI: f64 = 1200.0;

/// Reference temperature with no adjustment (°C)
pub const NEUTRAL_TEMPERATURE_C: f64 = 25.0;
/// Reference sea-level pressure (hPa)
pub const NEUTRAL_PRESSURE_HPA: f64 = 1013.0;

/// Horizon decay constant in steps: impact = exp(-step / 12)
const HORIZON_DECAY_STEPS: f64 = 12.0;

/// Ambient weather reading at forecast time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub pressure_hpa: f64,
}

impl Default for WeatherObservation {
    /// Neutral conditions: factor is exactly 1 at every step
    fn default() -> Self {
        Self {
            temperature_c: NEUTRAL_TEMPERATURE_C,
            humidity_percent: 0.0,
            pressure_hpa: NEUTRAL_PRESSURE_HPA,
        }
    }
}

impl WeatherObservation {
    pub fn new(temperature_c: f64, humidity_percent: f64, pressure_hpa: f64) -> Self {
        Self {
            temperature_c,
            humidity_percent,
            pressure_hpa,
        }
    }

    pub fn temperature_factor(&self) -> f64 {
        1.0 + (self.temperature_c - NEUTRAL_TEMPERATURE_C) * 0.003
    }

    pub fn humidity_factor(&self) -> f64 {
        1.0 - (self.humidity_percent / 100.0) * 0.15
    }

    pub fn pressure_factor(&self) -> f64 {
        1.0 + (self.pressure_hpa - NEUTRAL_PRESSURE_HPA) / NEUTRAL_PRESSURE_HPA * 0.05
    }

    /// Combined multiplicative factor for forecast step `step_index`
    pub fn factor(&self, step_index: usize) -> f64 {
        let impact = (-(step_index as f64) / HORIZON_DECAY_STEPS).exp();
        let deviation = (self.temperature_factor() - 1.0)
            + (self.humidity_factor() - 1.0)
            + (self.pressure_factor() - 1.0);
        1.0 + impact * deviation
    }

    /// Adjust a raw GHI value, clamped to `[0, MAX_GHI]`
    pub fn adjust(&self, base: f64, step_index: usize) -> f64 {
        let adjusted = base * self.factor(step_index);
        if adjusted.is_nan() {
            return 0.0;
        }
        adjusted.clamp(0.0, MAX_GHI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_weather_is_identity() {
        let weather = WeatherObservation::default();
        for step in 0..25 {
            assert_eq!(weather.factor(step), 1.0);
            assert_eq!(weather.adjust(500.0, step), 500.0);
        }
    }

    #[test]
    fn test_individual_factors() {
        let weather = WeatherObservation::new(35.0, 50.0, 1013.0 * 1.02);
        assert!((weather.temperature_factor() - 1.03).abs() < 1e-12);
        assert!((weather.humidity_factor() - 0.925).abs() < 1e-12);
        assert!((weather.pressure_factor() - 1.001).abs() < 1e-12);
    }

    #[test]
    fn test_influence_decays_with_horizon() {
        let humid = WeatherObservation::new(25.0, 100.0, 1013.0);
        // Step 0 carries the full -15% humidity penalty
        assert!((humid.factor(0) - 0.85).abs() < 1e-12);
        let f12 = humid.factor(12);
        assert!((f12 - (1.0 - 0.15 * (-1.0f64).exp())).abs() < 1e-12);
        assert!(humid.factor(24) > f12);
        assert!(humid.factor(200) > 0.9999);
    }

    #[test]
    fn test_adjust_clamps_to_ceiling() {
        let hot = WeatherObservation::new(5_000.0, 0.0, 1013.0);
        assert_eq!(hot.adjust(1000.0, 0), MAX_GHI);
    }

    #[test]
    fn test_adjust_never_negative() {
        let extreme = WeatherObservation::new(-10_000.0, 1_000.0, 0.0);
        assert!(extreme.factor(0) < 0.0);
        assert_eq!(extreme.adjust(800.0, 0), 0.0);
    }

    #[test]
    fn test_non_finite_weather_does_not_panic() {
        let broken = WeatherObservation::new(f64::NAN, 50.0, 1013.0);
        assert_eq!(broken.adjust(400.0, 3), 0.0);
        let inf = WeatherObservation::new(f64::INFINITY, 0.0, 1013.0);
        assert_eq!(inf.adjust(400.0, 0), MAX_GHI);
        assert_eq!(inf.adjust(0.0, 0), 0.0);
    }
}
