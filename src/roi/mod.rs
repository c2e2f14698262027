pub mod compare;
pub mod cost;
pub mod defaults;
pub mod funnel;
pub mod revenue;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use compare::compare;

// ============================================================================
// Inputs
// ============================================================================

/// One scenario's business rates. Percentages are plain numbers (`95.0` means
/// 95%) and are deliberately not range-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioInputs {
    pub name: String,
    pub pre_auth_decline: f64,
    pub post_auth_auto: f64,
    pub post_auth_manual: f64,
    #[serde(rename = "3dsUsage")]
    pub three_ds_usage: f64,
    #[serde(rename = "3dsError")]
    pub three_ds_error: f64,
    pub auth_rate: f64,
    pub chargeback_rate: f64,
    pub fixed_fee: f64,
    pub percentage_fee: f64,
    pub per_transaction_cost: f64,
    pub manual_review_cost: f64,
    #[serde(rename = "applyToNon3DS")]
    pub apply_to_non_3ds: bool,
}

/// Everything a comparison needs: shared economics plus the base (`s1`) and
/// comparison (`s2`) scenarios. This is also the shape of a saved session blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInputs {
    pub annual_attempts: f64,
    pub atv_success: f64,
    pub atv_decline: f64,
    #[serde(rename = "threeDSCost")]
    pub three_ds_cost: f64,
    pub retry_rate: f64,
    pub s1: ScenarioInputs,
    pub s2: ScenarioInputs,

    // Presentation state owned by the editor. Carried, never read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_common_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<BTreeMap<String, String>>,
}

impl CalculationInputs {
    /// Interpret a stored session blob. Anything that is not an object with an
    /// `annualAttempts` key, or that fails to deserialize, yields the defaults.
    pub fn from_session_blob(blob: &serde_json::Value, base_name: &str, comp_name: &str) -> Self {
        let looks_like_inputs = blob
            .as_object()
            .is_some_and(|obj| obj.contains_key("annualAttempts"));
        if looks_like_inputs {
            match serde_json::from_value::<CalculationInputs>(blob.clone()) {
                Ok(inputs) => return inputs,
                Err(e) => {
                    tracing::warn!("Stored session inputs did not parse, using defaults: {}", e);
                }
            }
        }
        defaults::default_inputs(base_name, comp_name)
    }
}

// ============================================================================
// Derived results
// ============================================================================

/// Transaction counts at each attrition stage, in funnel order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelData {
    pub start: f64,
    pub pre_auth_decline: f64,
    pub after_pre_auth: f64,
    pub three_ds_decline: f64,
    #[serde(rename = "after3DS")]
    pub after_3ds: f64,
    pub auth_decline: f64,
    pub after_auth: f64,
    pub post_auth_decline: f64,
    pub completed: f64,
    pub declined: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueData {
    pub raw: f64,
    pub conservative: f64,
}

/// Annual cost breakdown. The two tool sub-components default to zero when
/// absent so that older saved results still load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostData {
    pub chargeback: f64,
    #[serde(rename = "threeDS")]
    pub three_ds: f64,
    pub manual_review: f64,
    pub tool: f64,
    #[serde(default)]
    pub tool_judgment_cost: f64,
    #[serde(default)]
    pub tool_compensation_cost: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResults {
    pub name: String,
    pub funnel: FunnelData,
    pub revenue: RevenueData,
    pub costs: CostData,
    pub scenario_inputs: ScenarioInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub base: ScenarioResults,
    pub comp: ScenarioResults,
}

/// Headline deltas of the comparison scenario against the base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub completed_diff: f64,
    pub revenue_diff: f64,
    pub conservative_diff: f64,
    pub cost_diff: f64,
    /// Conservative revenue gained per unit of extra cost; 0 unless cost rose.
    pub roi: f64,
}

impl ComparisonResult {
    pub fn metrics(&self) -> ComparisonMetrics {
        let completed_diff = self.comp.funnel.completed - self.base.funnel.completed;
        let revenue_diff = self.comp.revenue.raw - self.base.revenue.raw;
        let conservative_diff = self.comp.revenue.conservative - self.base.revenue.conservative;
        let cost_diff = self.comp.costs.total - self.base.costs.total;
        let roi = if cost_diff > 0.0 {
            conservative_diff / cost_diff
        } else {
            0.0
        };

        ComparisonMetrics {
            completed_diff,
            revenue_diff,
            conservative_diff,
            cost_diff,
            roi,
        }
    }
}

/// Convert a percentage input (`12.5`) to a fraction (`0.125`).
pub(crate) fn pct(value: f64) -> f64 {
    value / 100.0
}
