use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::rate_limit::normalize_email;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginCheckRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRecordRequest {
    pub email: Option<String>,
    /// Anything other than a JSON `true` counts as a failed attempt.
    #[serde(default)]
    pub success: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedRateLimit {
    pub remaining_attempts: u32,
    pub reset_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCheckResponse {
    pub allowed: bool,
    pub rate_limit: AllowedRateLimit,
}

/// Client address: first `x-forwarded-for` hop, then `x-real-ip`, else
/// `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

fn require_email(email: Option<String>) -> Result<String, AppError> {
    match email {
        Some(e) if !e.is_empty() => Ok(normalize_email(&e)),
        _ => Err(AppError::BadRequest("Email address is required".to_string())),
    }
}

/// Gate a credential check. The email and the client IP are limited
/// independently; either one being blocked rejects the attempt.
pub async fn check_login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<LoginCheckRequest>,
) -> Result<Json<LoginCheckResponse>, AppError> {
    let email = require_email(body.email)?;
    let ip = client_ip(&headers);

    let limiter = state.limiter.clone();
    let (email_check, ip_check) =
        tokio::task::spawn_blocking(move || (limiter.check(&email), limiter.check(&ip)))
            .await
            .map_err(|e| AppError::Internal(format!("rate limit check aborted: {}", e)))?;

    if !email_check.allowed {
        info!("Login rejected: email is rate limited");
        return Err(AppError::rate_limited(&email_check));
    }
    if !ip_check.allowed {
        info!("Login rejected: client IP is rate limited");
        return Err(AppError::rate_limited(&ip_check));
    }

    Ok(Json(LoginCheckResponse {
        allowed: true,
        rate_limit: AllowedRateLimit {
            remaining_attempts: email_check
                .remaining_attempts
                .min(ip_check.remaining_attempts),
            reset_time: email_check.reset_time.or(ip_check.reset_time),
        },
    }))
}

/// Record the outcome of a credential check against both identifiers.
/// Storage problems never surface to the caller.
pub async fn record_login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<LoginRecordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = require_email(body.email)?;
    let ip = client_ip(&headers);
    let success = body.success == serde_json::Value::Bool(true);

    let limiter = state.limiter.clone();
    let recorded = tokio::task::spawn_blocking(move || {
        limiter.record(&email, success);
        limiter.record(&ip, success);
    })
    .await;
    if let Err(e) = recorded {
        warn!("Recording login attempt aborted: {}", e);
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
