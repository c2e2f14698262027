use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::rate_limit::RateLimitConfig;
use crate::state::SharedState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rate_limit: RateLimitConfig,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rate_limit: *state.limiter.config(),
    })
}
