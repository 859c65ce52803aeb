//! Forecast endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse, state::AppState},
    config::ForecastConfig,
    domain::{ForecastPoint, ForecastSummary, GhiQuality, ModelKind},
    forecast::{ForecastOutcome, ForecastRequest, WeatherObservation},
};

/// Forecast parameters; weather bounds match what the dashboard offers
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForecastBody {
    #[validate(range(min = 15.0, max = 45.0))]
    pub temperature_c: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity_percent: f64,
    #[validate(range(min = 900.0, max = 1100.0))]
    pub pressure_hpa: f64,
    pub model: Option<ModelKind>,
    /// Capped by `forecast.max_horizon_hours` in the engine
    pub horizon_hours: Option<usize>,
    pub include_now: Option<bool>,
    pub seed: Option<u64>,
}

impl ForecastBody {
    pub fn weather(&self) -> WeatherObservation {
        WeatherObservation::new(self.temperature_c, self.humidity_percent, self.pressure_hpa)
    }

    /// Fill unset fields from configuration
    pub fn to_request(&self, cfg: &ForecastConfig, now: DateTime<FixedOffset>) -> ForecastRequest {
        ForecastRequest::new(now, self.weather())
            .with_model(self.model.unwrap_or(cfg.default_model))
            .with_horizon(self.horizon_hours.unwrap_or(cfg.horizon_hours))
            .including_now(self.include_now.unwrap_or(cfg.include_now))
    }
}

#[derive(Debug, Serialize)]
pub struct PointView {
    #[serde(flatten)]
    pub point: ForecastPoint,
    pub quality: GhiQuality,
}

#[derive(Debug, Serialize)]
pub struct FailureView {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub model: ModelKind,
    pub model_name: &'static str,
    pub generated_at: DateTime<FixedOffset>,
    pub summary: ForecastSummary,
    pub points: Vec<PointView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureView>,
}

impl From<ForecastOutcome> for ForecastResponse {
    fn from(outcome: ForecastOutcome) -> Self {
        let series = outcome.series;
        Self {
            model: series.model,
            model_name: series.model.display_name(),
            generated_at: series.generated_at,
            summary: series.summary(),
            error: outcome.error.map(|e| FailureView {
                kind: e.kind(),
                message: e.to_string(),
            }),
            points: series
                .points
                .into_iter()
                .map(|point| PointView {
                    quality: point.quality(),
                    point,
                })
                .collect(),
        }
    }
}

fn run(state: &AppState, body: &ForecastBody) -> Result<ForecastOutcome, ApiError> {
    body.validate()?;
    let now = chrono::Local::now().fixed_offset();
    let request = body.to_request(&state.cfg.forecast, now);
    let context = state.context();
    let seed = body.seed.or(state.cfg.forecast.seed);
    Ok(state.engine.forecast_seeded(&context, &request, seed))
}

/// POST /api/v1/forecast
pub async fn create_forecast(
    State(state): State<AppState>,
    Json(body): Json<ForecastBody>,
) -> Result<ApiResponse<ForecastResponse>, ApiError> {
    let outcome = run(&state, &body)?;
    let message = outcome.error.as_ref().map(ToString::to_string);
    let response = ForecastResponse::from(outcome);
    Ok(match message {
        Some(message) => ApiResponse::degraded(response, message),
        None => ApiResponse::success(response),
    })
}

/// POST /api/v1/forecast/export - forecast table as CSV
pub async fn export_forecast(
    State(state): State<AppState>,
    Json(body): Json<ForecastBody>,
) -> Result<Response, ApiError> {
    let series = run(&state, &body)?.into_result()?;

    let mut buf = Vec::new();
    series
        .write_csv(&mut buf)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let filename = format!(
        "attachment; filename=\"ghi_forecast_{}.csv\"",
        series.generated_at.format("%Y%m%d_%H%M")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        buf,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: ModelKind,
    pub name: &'static str,
}

/// GET /api/v1/models
pub async fn list_models() -> ApiResponse<Vec<ModelInfo>> {
    use strum::IntoEnumIterator;
    ApiResponse::success(
        ModelKind::iter()
            .map(|id| ModelInfo {
                id,
                name: id.display_name(),
            })
            .collect(),
    )
}
