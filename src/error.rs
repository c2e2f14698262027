use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::rate_limit::RateLimitResult;

/// Rate-limit details returned alongside a 429.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub remaining_attempts: u32,
    pub reset_time: Option<chrono::DateTime<chrono::Utc>>,
    pub blocked_until: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&RateLimitResult> for RateLimitBody {
    fn from(r: &RateLimitResult) -> Self {
        Self {
            remaining_attempts: r.remaining_attempts,
            reset_time: r.reset_time,
            blocked_until: r.blocked_until,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    RateLimited {
        message: String,
        rate_limit: RateLimitBody,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn rate_limited(result: &RateLimitResult) -> Self {
        AppError::RateLimited {
            message: result
                .message
                .clone()
                .unwrap_or_else(|| "Too many login attempts".to_string()),
            rate_limit: RateLimitBody::from(result),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::RateLimited { message, rate_limit } => serde_json::json!({
                "error": message,
                "rateLimit": rate_limit,
            }),
            other => serde_json::json!({
                "error": other.to_string(),
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
