use super::{pct, FunnelData, ScenarioInputs};

/// Walk `annual_attempts` through the attrition stages of one scenario.
///
/// Each stage draws from the population that survived the previous one, with
/// one exception: the post-auth decline is a share of *all* attempts, not of
/// what survived authorization. Nothing is clamped, so extreme inputs can drive
/// `completed` negative.
pub fn compute_funnel(annual_attempts: f64, scenario: &ScenarioInputs) -> FunnelData {
    let start = annual_attempts;

    let pre_auth_decline = start * pct(scenario.pre_auth_decline);
    let after_pre_auth = start - pre_auth_decline;

    // Only the share routed through 3DS can fail there.
    let three_ds_decline =
        after_pre_auth * pct(scenario.three_ds_usage) * pct(scenario.three_ds_error);
    let after_3ds = after_pre_auth - three_ds_decline;

    let auth_decline = after_3ds * (1.0 - pct(scenario.auth_rate));
    let after_auth = after_3ds - auth_decline;

    let post_auth_decline =
        start * (pct(scenario.post_auth_auto) + pct(scenario.post_auth_manual));
    let completed = after_auth - post_auth_decline;

    FunnelData {
        start,
        pre_auth_decline,
        after_pre_auth,
        three_ds_decline,
        after_3ds,
        auth_decline,
        after_auth,
        post_auth_decline,
        completed,
        declined: start - completed,
    }
}
