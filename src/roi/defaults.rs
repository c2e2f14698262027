use super::{CalculationInputs, ScenarioInputs};

pub const DEFAULT_ANNUAL_ATTEMPTS: f64 = 3_182_624.0;
pub const DEFAULT_ATV_SUCCESS: f64 = 17_302.005_28;
pub const DEFAULT_ATV_DECLINE: f64 = 55_387.942_97;

/// Inputs a brand-new session starts from: the merchant's current setup
/// (full 3DS) against a screening tool that lets most traffic skip 3DS.
pub fn default_inputs(base_name: &str, comp_name: &str) -> CalculationInputs {
    CalculationInputs {
        annual_attempts: DEFAULT_ANNUAL_ATTEMPTS,
        atv_success: DEFAULT_ATV_SUCCESS,
        atv_decline: DEFAULT_ATV_DECLINE,
        three_ds_cost: 0.0,
        retry_rate: 0.0,
        s1: ScenarioInputs {
            name: base_name.to_string(),
            three_ds_usage: 100.0,
            three_ds_error: 6.0,
            auth_rate: 97.41,
            ..Default::default()
        },
        s2: ScenarioInputs {
            name: comp_name.to_string(),
            pre_auth_decline: 0.5,
            three_ds_usage: 5.0,
            three_ds_error: 50.0,
            auth_rate: 97.81,
            fixed_fee: 12_000_000.0,
            percentage_fee: 0.25,
            apply_to_non_3ds: true,
            ..Default::default()
        },
        hidden_fields: None,
        hidden_common_fields: None,
        comments: None,
    }
}
