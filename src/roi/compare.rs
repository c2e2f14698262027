use super::cost::compute_costs;
use super::funnel::compute_funnel;
use super::revenue::compute_revenue;
use super::{CalculationInputs, ComparisonResult, ScenarioResults};

/// Compare the base scenario (`s1`) with the comparison scenario (`s2`).
///
/// Pure: every call recomputes both scenarios from `inputs`. Revenue for both
/// scenarios is settled before any cost is computed, because the comparison's
/// conservative revenue is anchored on the base's raw revenue and costs read
/// the conservative figure.
pub fn compare(inputs: &CalculationInputs) -> ComparisonResult {
    let base_funnel = compute_funnel(inputs.annual_attempts, &inputs.s1);
    let comp_funnel = compute_funnel(inputs.annual_attempts, &inputs.s2);

    let base_revenue = compute_revenue(
        &base_funnel,
        inputs.atv_success,
        inputs.atv_decline,
        inputs.retry_rate,
        None,
    );
    let comp_revenue = compute_revenue(
        &comp_funnel,
        inputs.atv_success,
        inputs.atv_decline,
        inputs.retry_rate,
        Some(&base_funnel),
    );

    let base_costs = compute_costs(
        &inputs.s1,
        &base_revenue,
        inputs.annual_attempts,
        inputs.three_ds_cost,
    );
    let comp_costs = compute_costs(
        &inputs.s2,
        &comp_revenue,
        inputs.annual_attempts,
        inputs.three_ds_cost,
    );

    ComparisonResult {
        base: ScenarioResults {
            name: inputs.s1.name.clone(),
            funnel: base_funnel,
            revenue: base_revenue,
            costs: base_costs,
            scenario_inputs: inputs.s1.clone(),
        },
        comp: ScenarioResults {
            name: inputs.s2.name.clone(),
            funnel: comp_funnel,
            revenue: comp_revenue,
            costs: comp_costs,
            scenario_inputs: inputs.s2.clone(),
        },
    }
}
