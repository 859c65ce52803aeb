//! History endpoints

use axum::extract::{Query, State};
use chrono::{Datelike, Local, Month};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{
        error::ApiError,
        response::ApiResponse,
        state::{AppState, HistorySnapshot},
    },
    history::load_csv,
};

#[derive(Debug, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub snapshot: HistorySnapshot,
    /// Mean GHI per hour of day
    pub pattern: [f64; 24],
}

impl From<HistorySnapshot> for HistoryView {
    fn from(snapshot: HistorySnapshot) -> Self {
        Self {
            pattern: *snapshot.pattern().values(),
            snapshot,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadQuery {
    /// Month column (1-12) used for monthly profile files; defaults to the current month
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u8>,
}

/// GET /api/v1/history
pub async fn get_history(State(state): State<AppState>) -> ApiResponse<HistoryView> {
    ApiResponse::success(state.history().into())
}

/// PUT /api/v1/history - body is CSV text
pub async fn put_history(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: String,
) -> Result<ApiResponse<HistoryView>, ApiError> {
    query.validate()?;
    let month = match query.month {
        Some(m) => Month::try_from(m)
            .map_err(|_| ApiError::BadRequest(format!("invalid month {m}")))?,
        None => Month::try_from(Local::now().month() as u8)
            .map_err(|_| ApiError::InternalError("clock month out of range".to_string()))?,
    };

    let loaded = load_csv(body.as_bytes(), month)?;
    let snapshot = state.replace_history(loaded);
    Ok(ApiResponse::success(snapshot.into()))
}
