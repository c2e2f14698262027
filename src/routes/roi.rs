use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::config::{DEFAULT_BASE_SCENARIO_NAME, DEFAULT_COMP_SCENARIO_NAME};
use crate::error::AppError;
use crate::roi::{self, defaults, CalculationInputs, ComparisonMetrics, ComparisonResult};

#[derive(Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub result: ComparisonResult,
    pub metrics: ComparisonMetrics,
}

pub async fn default_inputs() -> Json<CalculationInputs> {
    Json(defaults::default_inputs(
        DEFAULT_BASE_SCENARIO_NAME,
        DEFAULT_COMP_SCENARIO_NAME,
    ))
}

/// Turn a saved session blob into inputs, substituting defaults for anything
/// that is not a usable set of inputs.
pub async fn resolve_inputs(Json(blob): Json<serde_json::Value>) -> Json<CalculationInputs> {
    Json(CalculationInputs::from_session_blob(
        &blob,
        DEFAULT_BASE_SCENARIO_NAME,
        DEFAULT_COMP_SCENARIO_NAME,
    ))
}

pub async fn compare(
    Json(inputs): Json<CalculationInputs>,
) -> Result<Json<CompareResponse>, AppError> {
    if inputs.annual_attempts.is_nan() || inputs.annual_attempts < 0.0 {
        return Err(AppError::BadRequest(
            "annualAttempts must be a non-negative number".to_string(),
        ));
    }

    let result = roi::compare(&inputs);
    let metrics = result.metrics();
    debug!(
        "Compared '{}' vs '{}': roi={:.2}",
        result.base.name, result.comp.name, metrics.roi
    );

    Ok(Json(CompareResponse { result, metrics }))
}
