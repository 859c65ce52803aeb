//! Recurrence models over the seasonal baseline
//!
//! The names follow the dashboards' vocabulary (ARIMA, SARIMA, ...) but each
//! model is a fixed, hand-tuned recurrence; nothing is estimated from data.

use super::daylight;
use super::noise::NoiseSource;
use super::seasonal::SeasonalPattern;
use crate::domain::{ModelKind, HOURS_PER_DAY};

/// Turns a seasonal pattern into a raw per-step forecast
pub trait BasePredictor {
    /// Predict `steps` values; step `i` covers hour `(start_hour + i) % 24`
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64>;
}

/// `0.7 * seasonal + 0.3 * previous`
#[derive(Debug, Clone, Copy)]
pub struct NaiveAr {
    pub seasonal_weight: f64,
    pub ar_weight: f64,
}

impl Default for NaiveAr {
    fn default() -> Self {
        Self {
            seasonal_weight: 0.7,
            ar_weight: 0.3,
        }
    }
}

/// `0.6 * seasonal + 0.25 * previous + 0.15 * value 12 steps back`
#[derive(Debug, Clone, Copy)]
pub struct SeasonalAr {
    pub seasonal_weight: f64,
    pub ar_weight: f64,
    pub lag_weight: f64,
    pub lag: usize,
}

impl Default for SeasonalAr {
    fn default() -> Self {
        Self {
            seasonal_weight: 0.6,
            ar_weight: 0.25,
            lag_weight: 0.15,
            lag: 12,
        }
    }
}

/// `alpha * seasonal + (1 - alpha) * previous`
#[derive(Debug, Clone, Copy)]
pub struct ExponentialSmoothing {
    pub alpha: f64,
}

impl Default for ExponentialSmoothing {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

/// Mean of the two previous values and the seasonal value
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverage;

/// Shared step loop: night short-circuit, recurrence, perturbation, floor at 0.
///
/// `step` receives the buffer of already stored values (including forced
/// zeros) and the seasonal value of the current hour.
fn run_recurrence<F>(
    seasonal: &SeasonalPattern,
    steps: usize,
    start_hour: u32,
    noise: &mut dyn NoiseSource,
    step: F,
) -> Vec<f64>
where
    F: Fn(&[f64], f64) -> f64,
{
    let mut predictions: Vec<f64> = Vec::with_capacity(steps);
    for i in 0..steps {
        let hour = (start_hour as usize + i) % HOURS_PER_DAY;
        if !daylight::is_daylight(hour as u32) {
            predictions.push(0.0);
            continue;
        }

        let mut value = step(&predictions, seasonal.get(hour));
        if value > 0.0 {
            value *= 1.0 + noise.next_perturbation();
        }
        predictions.push(value.max(0.0));
    }
    predictions
}

fn previous(history: &[f64]) -> Option<f64> {
    history.last().copied().filter(|v| *v > 0.0)
}

impl BasePredictor for NaiveAr {
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64> {
        run_recurrence(seasonal, steps, start_hour, noise, |history, base| {
            match previous(history) {
                Some(prev) => self.seasonal_weight * base + self.ar_weight * prev,
                None => base,
            }
        })
    }
}

impl BasePredictor for SeasonalAr {
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64> {
        run_recurrence(seasonal, steps, start_hour, noise, |history, base| {
            match previous(history) {
                Some(prev) => {
                    let i = history.len();
                    let lagged = if i >= self.lag {
                        history[i - self.lag]
                    } else {
                        0.0
                    };
                    self.seasonal_weight * base + self.ar_weight * prev + self.lag_weight * lagged
                }
                None => base,
            }
        })
    }
}

impl BasePredictor for ExponentialSmoothing {
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64> {
        run_recurrence(seasonal, steps, start_hour, noise, |history, base| {
            match previous(history) {
                Some(prev) => self.alpha * base + (1.0 - self.alpha) * prev,
                None => base,
            }
        })
    }
}

impl BasePredictor for MovingAverage {
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64> {
        run_recurrence(seasonal, steps, start_hour, noise, |history, base| {
            match history {
                [.., p2, p1] if *p1 > 0.0 && *p2 > 0.0 => (p1 + p2 + base) / 3.0,
                _ => base,
            }
        })
    }
}

impl BasePredictor for ModelKind {
    fn predict(
        &self,
        seasonal: &SeasonalPattern,
        steps: usize,
        start_hour: u32,
        noise: &mut dyn NoiseSource,
    ) -> Vec<f64> {
        match self {
            ModelKind::NaiveAr => NaiveAr::default().predict(seasonal, steps, start_hour, noise),
            ModelKind::SeasonalAr => {
                SeasonalAr::default().predict(seasonal, steps, start_hour, noise)
            }
            ModelKind::ExponentialSmoothing => {
                ExponentialSmoothing::default().predict(seasonal, steps, start_hour, noise)
            }
            ModelKind::MovingAverage => {
                MovingAverage.predict(seasonal, steps, start_hour, noise)
            }
        }
    }
}
