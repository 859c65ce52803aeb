//! Seasonal pattern extraction
//!
//! Reduces a historical series (or a pre-tabulated profile) to the mean GHI
//! per hour of day. All predictors use this as their baseline.

use serde::{Deserialize, Serialize};

use crate::domain::{HistoricalSample, HistoryInput, HourlyProfile, HOURS_PER_DAY};

/// Most recent samples considered when extracting from a raw series (7 days)
pub const SEASONAL_WINDOW: usize = 7 * HOURS_PER_DAY;

/// Mean GHI per hour of day, indexed 0..23
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern([f64; HOURS_PER_DAY]);

impl SeasonalPattern {
    /// Pattern with every hour at 0
    pub fn zeros() -> Self {
        Self([0.0; HOURS_PER_DAY])
    }

    /// Extract the pattern from either input shape
    pub fn extract(input: &HistoryInput) -> Self {
        match input {
            HistoryInput::Series(samples) => Self::from_samples(samples),
            HistoryInput::Profile(profile) => Self::from_profile(profile),
        }
    }

    /// Average the tail of an hourly series into 24 buckets.
    ///
    /// The bucket of a sample is its position within the selected tail modulo
    /// 24, not the wall-clock hour of its timestamp. The tail is assumed to be
    /// hourly-contiguous.
    pub fn from_samples(samples: &[HistoricalSample]) -> Self {
        let tail = &samples[samples.len().saturating_sub(SEASONAL_WINDOW)..];

        let mut sums = [0.0; HOURS_PER_DAY];
        let mut counts = [0usize; HOURS_PER_DAY];
        for (i, sample) in tail.iter().enumerate() {
            let hour = i % HOURS_PER_DAY;
            sums[hour] += sample.ghi;
            counts[hour] += 1;
        }

        let mut means = [0.0; HOURS_PER_DAY];
        for hour in 0..HOURS_PER_DAY {
            means[hour] = sums[hour] / counts[hour].max(1) as f64;
        }
        Self::sanitized(means)
    }

    /// Identity over a 24-row profile; negative or non-finite cells become 0
    pub fn from_profile(profile: &HourlyProfile) -> Self {
        Self::sanitized(*profile.values())
    }

    fn sanitized(mut values: [f64; HOURS_PER_DAY]) -> Self {
        for v in values.iter_mut() {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        }
        Self(values)
    }

    /// Mean GHI for an hour of day; hours wrap modulo 24
    pub fn get(&self, hour: usize) -> f64 {
        self.0[hour % HOURS_PER_DAY]
    }

    pub fn values(&self) -> &[f64; HOURS_PER_DAY] {
        &self.0
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for SeasonalPattern {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<HourlyProfile> for SeasonalPattern {
    fn from(profile: HourlyProfile) -> Self {
        Self::from_profile(&profile)
    }
}
