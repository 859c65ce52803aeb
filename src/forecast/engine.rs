use chrono::{DateTime, Duration, FixedOffset, Local, Timelike};
use tracing::{debug, error, warn};

use super::confidence::ConfidenceModel;
use super::daylight;
use super::models::BasePredictor;
use super::noise::{GaussianNoise, NoiseSource, DEFAULT_NOISE_STD_DEV};
use super::seasonal::SeasonalPattern;
use super::weather::WeatherObservation;
use super::ForecastError;
use crate::config::ForecastConfig;
use crate::domain::{ForecastPoint, ForecastSeries, HistoryInput, ModelKind};

/// Default number of hourly steps
pub const DEFAULT_HORIZON_STEPS: usize = 24;
/// Longest accepted horizon (7 days)
pub const MAX_HORIZON_STEPS: usize = 168;

/// Read-only inputs shared by every forecast over one history snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastContext {
    pattern: SeasonalPattern,
}

impl ForecastContext {
    pub fn new(pattern: SeasonalPattern) -> Self {
        Self { pattern }
    }

    pub fn from_history(history: &HistoryInput) -> Self {
        Self::new(SeasonalPattern::extract(history))
    }

    pub fn pattern(&self) -> &SeasonalPattern {
        &self.pattern
    }
}

/// One forecast invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Anchor of step 0
    pub now: DateTime<FixedOffset>,
    pub weather: WeatherObservation,
    pub model: ModelKind,
    pub horizon_steps: usize,
    /// Emit `horizon_steps + 1` points, step 0 being "now"
    pub include_now: bool,
}

impl ForecastRequest {
    pub fn new(now: DateTime<FixedOffset>, weather: WeatherObservation) -> Self {
        Self {
            now,
            weather,
            model: ModelKind::default(),
            horizon_steps: DEFAULT_HORIZON_STEPS,
            include_now: false,
        }
    }

    /// Request anchored at the local wall clock
    pub fn now(weather: WeatherObservation) -> Self {
        Self::new(Local::now().fixed_offset(), weather)
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_horizon(mut self, steps: usize) -> Self {
        self.horizon_steps = steps;
        self
    }

    pub fn including_now(mut self, include_now: bool) -> Self {
        self.include_now = include_now;
        self
    }

    /// Number of points the series will hold
    pub fn output_len(&self) -> usize {
        if self.include_now {
            self.horizon_steps + 1
        } else {
            self.horizon_steps
        }
    }
}

/// Result of [`ForecastEngine::forecast`]: always a well-formed series
#[derive(Debug)]
pub struct ForecastOutcome {
    pub series: ForecastSeries,
    /// Set when the series is a zero-filled fallback
    pub error: Option<ForecastError>,
}

impl ForecastOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<ForecastSeries, ForecastError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.series),
        }
    }
}

/// Assembles seasonal baseline, model, weather, daylight and confidence
/// into a timestamped forecast. Holds configuration only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastEngine {
    pub confidence: ConfidenceModel,
    pub noise_std_dev: f64,
    pub max_horizon_steps: usize,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            confidence: ConfidenceModel::default(),
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
            max_horizon_steps: MAX_HORIZON_STEPS,
        }
    }
}

impl ForecastEngine {
    pub fn new(confidence: ConfidenceModel, noise_std_dev: f64, max_horizon_steps: usize) -> Self {
        Self {
            confidence,
            noise_std_dev,
            max_horizon_steps,
        }
    }

    pub fn from_config(cfg: &ForecastConfig) -> Self {
        Self::new(
            ConfidenceModel::new(cfg.confidence_floor, cfg.confidence_decay_rate),
            cfg.noise_std_dev,
            cfg.max_horizon_hours,
        )
    }

    /// Run the full pipeline, propagating failures
    pub fn try_forecast(
        &self,
        ctx: &ForecastContext,
        req: &ForecastRequest,
        noise: &mut dyn NoiseSource,
    ) -> Result<ForecastSeries, ForecastError> {
        if req.horizon_steps > self.max_horizon_steps {
            return Err(ForecastError::HorizonTooLong {
                requested: req.horizon_steps,
                max: self.max_horizon_steps,
            });
        }
        let len = req.output_len();
        let timestamps = step_timestamps(req.now, len).ok_or(ForecastError::TimestampOutOfRange)?;

        if ctx.pattern.is_all_zero() {
            warn!("seasonal pattern is all zero; forecast will be zero");
        }

        let start_hour = req.now.hour();
        debug!(model = %req.model, steps = len, start_hour, "running GHI forecast");

        let raw = req.model.predict(&ctx.pattern, len, start_hour, noise);
        let (points, corrections) = self.finalize(&raw, &timestamps, &req.weather);
        if corrections > 0 {
            error!(
                corrections,
                model = %req.model,
                "daylight guard zeroed values the predictor left non-zero"
            );
        }

        Ok(ForecastSeries {
            generated_at: req.now,
            model: req.model,
            points,
        })
    }

    /// Run the pipeline; on failure return a zero-filled series plus the error
    pub fn forecast(
        &self,
        ctx: &ForecastContext,
        req: &ForecastRequest,
        noise: &mut dyn NoiseSource,
    ) -> ForecastOutcome {
        match self.try_forecast(ctx, req, noise) {
            Ok(series) => ForecastOutcome {
                series,
                error: None,
            },
            Err(e) => self.fallback(req, e),
        }
    }

    /// Like [`forecast`](Self::forecast) with a per-call Gaussian noise
    /// generator, seeded when `seed` is given
    pub fn forecast_seeded(
        &self,
        ctx: &ForecastContext,
        req: &ForecastRequest,
        seed: Option<u64>,
    ) -> ForecastOutcome {
        match GaussianNoise::new(seed, self.noise_std_dev) {
            Ok(mut noise) => self.forecast(ctx, req, &mut noise),
            Err(e) => self.fallback(req, e),
        }
    }

    fn fallback(&self, req: &ForecastRequest, e: ForecastError) -> ForecastOutcome {
        error!(error = %e, model = %req.model, "forecast failed, returning zero-filled series");
        ForecastOutcome {
            series: self.zero_filled(req),
            error: Some(e),
        }
    }

    /// All-zero series with the request's shape (capped at the max horizon)
    pub fn zero_filled(&self, req: &ForecastRequest) -> ForecastSeries {
        let len = req.output_len().min(self.max_horizon_steps + 1);
        let points = (0..len)
            .map_while(|i| {
                req.now
                    .checked_add_signed(Duration::hours(i as i64))
                    .map(|ts| self.point(i, ts, 0.0))
            })
            .collect();
        ForecastSeries {
            generated_at: req.now,
            model: req.model,
            points,
        }
    }

    /// Weather adjustment, final daylight pass and confidence per step.
    /// Returns the points and how many values the daylight pass had to zero.
    pub(crate) fn finalize(
        &self,
        raw: &[f64],
        timestamps: &[DateTime<FixedOffset>],
        weather: &WeatherObservation,
    ) -> (Vec<ForecastPoint>, usize) {
        let mut corrections = 0;
        let points = raw
            .iter()
            .zip(timestamps)
            .enumerate()
            .map(|(i, (base, ts))| {
                let adjusted = weather.adjust(*base, i);
                let ghi = daylight::constrain(ts.hour(), adjusted);
                if ghi != adjusted {
                    corrections += 1;
                }
                self.point(i, *ts, ghi)
            })
            .collect();
        (points, corrections)
    }

    fn point(&self, step: usize, timestamp: DateTime<FixedOffset>, ghi: f64) -> ForecastPoint {
        ForecastPoint {
            timestamp,
            hour_label: timestamp.format("%H:%M").to_string(),
            ghi: ghi.round() as u32,
            confidence: self.confidence.score(step),
        }
    }
}

fn step_timestamps(now: DateTime<FixedOffset>, len: usize) -> Option<Vec<DateTime<FixedOffset>>> {
    (0..len)
        .map(|i| now.checked_add_signed(Duration::hours(i as i64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HistoricalSample, HourlyProfile, HOURS_PER_DAY};
    use crate::forecast::noise::{MockNoiseSource, ZeroNoise};
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 12, 10, hour, minute, 0)
            .unwrap()
    }

    fn peak_context() -> ForecastContext {
        let mut hours = [0.0; HOURS_PER_DAY];
        hours[11] = 500.0;
        ForecastContext::new(SeasonalPattern::from_profile(&HourlyProfile(hours)))
    }

    fn bell_context() -> ForecastContext {
        let mut hours = [0.0; HOURS_PER_DAY];
        for h in 6..18 {
            hours[h] = 1000.0 * (-0.5 * ((h as f64 - 12.0) / 3.0).powi(2)).exp();
        }
        ForecastContext::new(SeasonalPattern::from_profile(&HourlyProfile(hours)))
    }

    #[test]
    fn test_peak_hour_with_neutral_weather() {
        let engine = ForecastEngine::default();
        let req = ForecastRequest::new(at(8, 0), WeatherObservation::default());
        let series = engine.try_forecast(&peak_context(), &req, &mut ZeroNoise).unwrap();
        let eleven = series
            .points
            .iter()
            .find(|p| p.hour_label == "11:00")
            .unwrap();
        assert_eq!(eleven.ghi, 500);
    }

    #[test]
    fn test_length_and_timestamps() {
        let engine = ForecastEngine::default();
        let req = ForecastRequest::new(at(14, 25), WeatherObservation::default());
        let series = engine.try_forecast(&bell_context(), &req, &mut ZeroNoise).unwrap();
        assert_eq!(series.len(), 24);
        assert_eq!(series.points[0].hour_label, "14:25");
        assert_eq!(series.points[1].hour_label, "15:25");
        assert_eq!(series.points[23].hour_label, "13:25");
        assert_eq!(series.points[23].timestamp, at(14, 25) + Duration::hours(23));

        let series = engine
            .try_forecast(&bell_context(), &req.clone().including_now(true), &mut ZeroNoise)
            .unwrap();
        assert_eq!(series.len(), 25);
    }

    #[test]
    fn test_night_steps_are_zero_for_every_model() {
        let engine = ForecastEngine::default();
        let weather = WeatherObservation::new(40.0, 10.0, 1050.0);
        for model in ModelKind::iter() {
            for start in 0..24 {
                let req = ForecastRequest::new(at(start, 0), weather)
                    .with_model(model)
                    .including_now(true);
                let series = engine.forecast_seeded(&bell_context(), &req, Some(3)).series;
                for p in &series.points {
                    let hour = p.timestamp.hour();
                    if !(6..18).contains(&hour) {
                        assert_eq!(p.ghi, 0, "{model} at {}", p.hour_label);
                    }
                    assert!(p.ghi <= 1200);
                }
            }
        }
    }

    #[test]
    fn test_daylight_guard_agrees_with_predictors() {
        let engine = ForecastEngine::default();
        let ctx = bell_context();
        let weather = WeatherObservation::new(30.0, 65.0, 1000.0);
        for model in ModelKind::iter() {
            for start in 0..24 {
                let now = at(start, 0);
                let raw = model.predict(ctx.pattern(), 25, start, &mut ZeroNoise);
                let timestamps = step_timestamps(now, 25).unwrap();
                let (_, corrections) = engine.finalize(&raw, &timestamps, &weather);
                assert_eq!(corrections, 0, "{model} starting at {start}");
            }
        }
    }

    #[test]
    fn test_finalize_zeroes_and_counts_night_values() {
        let engine = ForecastEngine::default();
        let timestamps = step_timestamps(at(17, 0), 3).unwrap();
        let (points, corrections) =
            engine.finalize(&[300.0, 300.0, 0.0], &timestamps, &WeatherObservation::default());
        assert_eq!(points[0].ghi, 300);
        assert_eq!(points[1].ghi, 0);
        assert_eq!(corrections, 1);
    }

    #[test]
    fn test_confidence_attached() {
        let engine = ForecastEngine::default();
        let req = ForecastRequest::new(at(6, 0), WeatherObservation::default());
        let series = engine.try_forecast(&bell_context(), &req, &mut ZeroNoise).unwrap();
        assert_eq!(series.points[0].confidence, 95.0);
        assert_eq!(series.points[2].confidence, 92.0);
        assert_eq!(series.points[23].confidence, 60.5);
    }

    #[test]
    fn test_seeded_forecast_is_reproducible() {
        let engine = ForecastEngine::default();
        let req = ForecastRequest::new(at(5, 0), WeatherObservation::new(28.0, 65.0, 1013.0))
            .with_model(ModelKind::SeasonalAr);
        let a = engine.forecast_seeded(&bell_context(), &req, Some(99));
        let b = engine.forecast_seeded(&bell_context(), &req, Some(99));
        assert!(a.is_ok());
        assert_eq!(a.series, b.series);
    }

    #[test]
    fn test_empty_history_gives_zero_series() {
        let engine = ForecastEngine::default();
        let empty: Vec<HistoricalSample> = Vec::new();
        let ctx = ForecastContext::from_history(&HistoryInput::Series(empty));
        let req = ForecastRequest::new(at(9, 0), WeatherObservation::new(45.0, 0.0, 1100.0));
        let outcome = engine.forecast_seeded(&ctx, &req, None);
        assert!(outcome.is_ok());
        assert_eq!(outcome.series.len(), 24);
        assert!(outcome.series.points.iter().all(|p| p.ghi == 0));
    }

    #[test]
    fn test_horizon_too_long_falls_back_to_zero_series() {
        let engine = ForecastEngine::default();
        let req =
            ForecastRequest::new(at(9, 0), WeatherObservation::default()).with_horizon(1_000);
        let outcome = engine.forecast(&bell_context(), &req, &mut ZeroNoise);
        assert!(matches!(
            outcome.error,
            Some(ForecastError::HorizonTooLong {
                requested: 1_000,
                max: 168
            })
        ));
        assert_eq!(outcome.series.len(), 169);
        assert!(outcome.series.points.iter().all(|p| p.ghi == 0));
        assert_eq!(outcome.series.points[0].confidence, 95.0);
    }

    #[test]
    fn test_invalid_noise_falls_back() {
        let engine = ForecastEngine {
            noise_std_dev: -1.0,
            ..ForecastEngine::default()
        };
        let req = ForecastRequest::new(at(9, 0), WeatherObservation::default());
        let outcome = engine.forecast_seeded(&bell_context(), &req, Some(1));
        assert!(matches!(outcome.error, Some(ForecastError::InvalidNoise(_))));
        assert_eq!(outcome.series.len(), 24);
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_timestamp_overflow_is_reported() {
        let engine = ForecastEngine::default();
        let end_of_time = DateTime::<chrono::Utc>::MAX_UTC.fixed_offset();
        let req = ForecastRequest::new(end_of_time, WeatherObservation::default());
        let outcome = engine.forecast(&bell_context(), &req, &mut ZeroNoise);
        assert!(matches!(outcome.error, Some(ForecastError::TimestampOutOfRange)));
        assert_eq!(outcome.series.len(), 1);
    }

    #[test]
    fn test_noise_is_drawn_per_daylight_step() {
        let engine = ForecastEngine::default();
        let mut noise = MockNoiseSource::new();
        // 12 daylight hours in a 24 step window
        noise.expect_next_perturbation().times(12).return_const(0.0);
        let req = ForecastRequest::new(at(0, 0), WeatherObservation::default());
        engine.try_forecast(&bell_context(), &req, &mut noise).unwrap();
    }

    #[test]
    fn test_calls_are_independent() {
        let engine = ForecastEngine::default();
        let ctx = bell_context();
        let req = ForecastRequest::new(at(7, 0), WeatherObservation::default());
        let first = engine.try_forecast(&ctx, &req, &mut ZeroNoise).unwrap();
        let humid = ForecastRequest::new(at(7, 0), WeatherObservation::new(25.0, 100.0, 1013.0));
        let _ = engine.try_forecast(&ctx, &humid, &mut ZeroNoise).unwrap();
        let again = engine.try_forecast(&ctx, &req, &mut ZeroNoise).unwrap();
        assert_eq!(first, again);
    }
}
