use super::{pct, FunnelData, RevenueData};

/// Revenue for one scenario.
///
/// With no `baseline`, this is the base scenario: completed volume at the
/// success ATV, and `conservative == raw`. With a baseline funnel, the
/// scenario is valued as the base revenue plus its extra completions at the
/// *decline* ATV, and `conservative` discounts those extra completions by
/// `retry_rate` percent (customers who would have paid anyway on retry).
pub fn compute_revenue(
    funnel: &FunnelData,
    atv_success: f64,
    atv_decline: f64,
    retry_rate: f64,
    baseline: Option<&FunnelData>,
) -> RevenueData {
    match baseline {
        None => {
            let raw = funnel.completed * atv_success;
            RevenueData {
                raw,
                conservative: raw,
            }
        }
        Some(base) => {
            let base_raw = base.completed * atv_success;
            let incremental = (funnel.completed - base.completed) * atv_decline;
            RevenueData {
                raw: base_raw + incremental,
                conservative: base_raw + incremental * (1.0 - pct(retry_rate)),
            }
        }
    }
}
