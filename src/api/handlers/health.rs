use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub telegram: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Reports configuration only; no call is made to the Bot API
    let telegram_status = if state.config.telegram.is_configured() {
        "configured"
    } else {
        "missing"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        telegram: telegram_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
