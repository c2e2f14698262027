use super::{pct, CostData, RevenueData, ScenarioInputs};

/// Annual costs of running one scenario.
///
/// Revenue-proportional costs are taken from `revenue.conservative`, so the
/// comparison's revenue pass must already have run for both scenarios.
pub fn compute_costs(
    scenario: &ScenarioInputs,
    revenue: &RevenueData,
    annual_attempts: f64,
    three_ds_cost: f64,
) -> CostData {
    let chargeback = revenue.conservative * pct(scenario.chargeback_rate);
    let three_ds = annual_attempts * pct(scenario.three_ds_usage) * three_ds_cost;
    let manual_review = scenario.manual_review_cost;

    let tool_judgment_cost = scenario.fixed_fee + annual_attempts * scenario.per_transaction_cost;
    let tool_compensation_cost = percentage_fee_component(scenario, revenue.conservative);
    let tool = tool_judgment_cost + tool_compensation_cost;

    CostData {
        chargeback,
        three_ds,
        manual_review,
        tool,
        tool_judgment_cost,
        tool_compensation_cost,
        total: chargeback + three_ds + manual_review + tool,
    }
}

/// The vendor's revenue-share fee. With `apply_to_non_3ds` the fee is only
/// charged on the share of traffic that skipped 3DS.
fn percentage_fee_component(scenario: &ScenarioInputs, conservative_revenue: f64) -> f64 {
    let fee = conservative_revenue * pct(scenario.percentage_fee);
    if scenario.apply_to_non_3ds {
        fee * (1.0 - pct(scenario.three_ds_usage))
    } else {
        fee
    }
}
