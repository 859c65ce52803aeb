use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Number of hour-of-day buckets in a profile
pub const HOURS_PER_DAY: usize = 24;

/// A single historical irradiance observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    pub timestamp: DateTime<FixedOffset>,
    /// Global horizontal irradiance (W/m²), finite and non-negative
    pub ghi: f64,
}

impl HistoricalSample {
    /// Create a sample, returning `None` when the GHI is negative or not finite
    pub fn new(timestamp: DateTime<FixedOffset>, ghi: f64) -> Option<Self> {
        if ghi.is_finite() && ghi >= 0.0 {
            Some(Self { timestamp, ghi })
        } else {
            None
        }
    }
}

/// Pre-tabulated typical GHI per hour of day (e.g. a monthly reference profile)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyProfile(pub [f64; HOURS_PER_DAY]);

impl HourlyProfile {
    /// Build a profile from up to 24 values; missing hours are 0
    pub fn from_values(values: &[f64]) -> Self {
        let mut hours = [0.0; HOURS_PER_DAY];
        for (slot, v) in hours.iter_mut().zip(values) {
            *slot = *v;
        }
        Self(hours)
    }

    pub fn values(&self) -> &[f64; HOURS_PER_DAY] {
        &self.0
    }
}

impl Default for HourlyProfile {
    fn default() -> Self {
        Self([0.0; HOURS_PER_DAY])
    }
}

/// History handed to the seasonal pattern extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum HistoryInput {
    /// Raw hourly series, oldest first
    Series(Vec<HistoricalSample>),
    /// Ready 24-row hour→GHI table
    Profile(HourlyProfile),
}

impl HistoryInput {
    /// Number of underlying rows (samples or profile hours)
    pub fn len(&self) -> usize {
        match self {
            Self::Series(samples) => samples.len(),
            Self::Profile(_) => HOURS_PER_DAY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HistoryInput {
    fn default() -> Self {
        Self::Series(Vec::new())
    }
}
