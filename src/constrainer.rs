#![allow(dead_code)]
//! Converts the prioritiser's raw power request into one that honours
//! physical and contractual limits, in the fixed order battery limits,
//! site connection limits, then SoE limits.
use serde::{Deserialize, Serialize};

use crate::domain::types::{Energy, Power};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatteryLimits {
    pub charge_power_limit: Power,
    pub discharge_power_limit: Power,
    pub soe_min: Energy,
    pub soe_max: Energy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SiteLimits {
    pub import_power_limit: Power,
    pub export_power_limit: Power,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintDiagnostics {
    pub bess_power_active: bool,
    pub site_power_active: bool,
    pub bess_soe_active: bool,
}

pub fn constrain(
    raw: Power,
    battery: &BatteryLimits,
    site: &SiteLimits,
    soe: Energy,
    last_commanded: Power,
    site_power: Power,
) -> (Power, ConstraintDiagnostics) {
    let mut diagnostics = ConstraintDiagnostics::default();

    let mut clamped = raw.clamp(-battery.charge_power_limit, battery.discharge_power_limit);
    if clamped != raw {
        diagnostics.bess_power_active = true;
    }

    let expected_site = site_power.as_kw() - (clamped.as_kw() - last_commanded.as_kw());
    if expected_site > site.import_power_limit.as_kw() {
        clamped = Power::kw(
            last_commanded.as_kw() - (site.import_power_limit.as_kw() - site_power.as_kw()),
        );
        diagnostics.site_power_active = true;
    } else if expected_site < -site.export_power_limit.as_kw() {
        clamped = Power::kw(
            last_commanded.as_kw() - (-site.export_power_limit.as_kw() - site_power.as_kw()),
        );
        diagnostics.site_power_active = true;
    }

    if clamped.as_kw() > 0.0 && soe.as_kwh() <= battery.soe_min.as_kwh() {
        clamped = Power::ZERO;
        diagnostics.bess_soe_active = true;
    } else if clamped.as_kw() < 0.0 && soe.as_kwh() >= battery.soe_max.as_kwh() {
        clamped = Power::ZERO;
        diagnostics.bess_soe_active = true;
    }

    (clamped, diagnostics)
}

/// `constrain(+inf)` with no schedule considerations: the maximum power
/// the battery could discharge right now, given the same three clamps.
pub fn max_battery_discharge(
    battery: &BatteryLimits,
    site: &SiteLimits,
    soe: Energy,
    last_commanded: Power,
    site_power: Power,
) -> Power {
    constrain(
        Power::INFINITY,
        battery,
        site,
        soe,
        last_commanded,
        site_power,
    )
    .0
}
