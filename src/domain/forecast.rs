use std::io;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Recurrence model used to turn the seasonal baseline into a raw forecast
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    #[default]
    #[serde(alias = "arima")]
    #[strum(to_string = "naive-ar", serialize = "arima")]
    NaiveAr,
    #[serde(alias = "sarima")]
    #[strum(to_string = "seasonal-ar", serialize = "sarima")]
    SeasonalAr,
    #[serde(alias = "exponential")]
    #[strum(to_string = "exponential-smoothing", serialize = "exponential")]
    ExponentialSmoothing,
    #[serde(alias = "moving_average")]
    #[strum(to_string = "moving-average", serialize = "moving_average")]
    MovingAverage,
}

impl ModelKind {
    /// Human readable name shown on dashboards
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NaiveAr => "ARIMA",
            Self::SeasonalAr => "SARIMA (Seasonal)",
            Self::ExponentialSmoothing => "Exponential Smoothing",
            Self::MovingAverage => "Moving Average",
        }
    }
}

/// Categorical irradiance level derived purely from the GHI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GhiQuality {
    Night,
    Poor,
    Fair,
    Good,
}

impl GhiQuality {
    /// 0 → night, <200 → poor, 200..=600 → fair, >600 → good
    pub fn from_ghi(ghi: u32) -> Self {
        match ghi {
            0 => Self::Night,
            1..=199 => Self::Poor,
            200..=600 => Self::Fair,
            _ => Self::Good,
        }
    }
}

/// One hourly step of a GHI forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<FixedOffset>,
    /// Wall-clock label of the timestamp, `HH:MM`
    pub hour_label: String,
    /// Forecasted GHI (W/m²), rounded
    pub ghi: u32,
    /// Heuristic confidence in percent
    pub confidence: f64,
}

impl ForecastPoint {
    pub fn quality(&self) -> GhiQuality {
        GhiQuality::from_ghi(self.ghi)
    }
}

/// Aggregate statistics over a forecast series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Highest GHI in the series (W/m²)
    pub peak_ghi: u32,
    /// Mean GHI over all steps (W/m²)
    pub mean_ghi: f64,
    /// Irradiation over the horizon (kWh/m²), assuming hourly steps
    pub total_energy_kwh_m2: f64,
}

/// Tabular export row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: String,
    pub hour: String,
    pub ghi: u32,
    pub confidence: String,
    pub quality: GhiQuality,
}

/// Chronological hourly GHI forecast, produced fresh per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// Anchor time of the forecast ("now" of the request)
    pub generated_at: DateTime<FixedOffset>,
    pub model: ModelKind,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// GHI values in step order
    pub fn ghi_values(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.ghi).collect()
    }

    pub fn summary(&self) -> ForecastSummary {
        if self.points.is_empty() {
            return ForecastSummary::default();
        }
        let total: u64 = self.points.iter().map(|p| u64::from(p.ghi)).sum();
        ForecastSummary {
            peak_ghi: self.points.iter().map(|p| p.ghi).max().unwrap_or(0),
            mean_ghi: total as f64 / self.points.len() as f64,
            total_energy_kwh_m2: total as f64 / 1000.0,
        }
    }

    /// Rows for table/CSV export
    pub fn rows(&self) -> Vec<ForecastRow> {
        self.points
            .iter()
            .map(|p| ForecastRow {
                timestamp: p.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
                hour: p.hour_label.clone(),
                ghi: p.ghi,
                confidence: format!("{:.1}", p.confidence),
                quality: p.quality(),
            })
            .collect()
    }

    /// Write the export rows as CSV with a header line
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
