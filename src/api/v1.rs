use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::api::{forecast, history, state::AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/models", get(forecast::list_models))
        .route("/history", get(history::get_history).put(history::put_history))
        .route("/forecast", post(forecast::create_forecast))
        .route("/forecast/export", post(forecast::export_forecast))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
