use thiserror::Error;

/// Failures inside the forecasting pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Horizon of {requested} steps exceeds the maximum of {max}")]
    HorizonTooLong { requested: usize, max: usize },

    #[error("Invalid noise configuration: {0}")]
    InvalidNoise(String),

    #[error("Forecast timestamps overflow the supported date range")]
    TimestampOutOfRange,
}

impl ForecastError {
    /// Stable machine-readable kind, used in API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HorizonTooLong { .. } => "HorizonTooLong",
            Self::InvalidNoise(_) => "InvalidNoise",
            Self::TimestampOutOfRange => "TimestampOutOfRange",
        }
    }
}
