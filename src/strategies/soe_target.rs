//! Charge-to-SoE and discharge-to-SoE: ramp the battery towards a target
//! state of energy by the end of a configured window.
use serde::{Deserialize, Serialize};

use crate::domain::component::ControlComponent;
use crate::domain::time::DayedPeriod;
use crate::domain::types::{Energy, InstantT, Power};

use super::Telemetry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoeTargetConfig {
    pub period: DayedPeriod,
    pub target_soe: Energy,
}

const CHARGE_NAME: &str = "charge_to_soe";
const DISCHARGE_NAME: &str = "discharge_to_soe";

fn hours_to_period_end(t: InstantT, period: &DayedPeriod) -> Option<f64> {
    let absolute = period.absolutise(t)?;
    let hours = absolute.end.duration_since(t).num_milliseconds() as f64 / 3_600_000.0;
    if hours > 0.0 {
        Some(hours)
    } else {
        None
    }
}

pub fn evaluate_charge_to_soe(
    t: InstantT,
    cfg: &SoeTargetConfig,
    tele: &Telemetry,
) -> ControlComponent {
    let Some(hours) = hours_to_period_end(t, &cfg.period) else {
        return ControlComponent::inactive(CHARGE_NAME);
    };
    let energy = (cfg.target_soe - tele.soe).as_kwh() / tele.charge_efficiency;
    if energy <= 0.0 {
        return ControlComponent::inactive(CHARGE_NAME);
    }
    let power = Power::kw(-energy / hours);
    ControlComponent::active(CHARGE_NAME, Some(power), None, Some(power))
}

pub fn evaluate_discharge_to_soe(
    t: InstantT,
    cfg: &SoeTargetConfig,
    tele: &Telemetry,
) -> ControlComponent {
    let Some(hours) = hours_to_period_end(t, &cfg.period) else {
        return ControlComponent::inactive(DISCHARGE_NAME);
    };
    let energy = (tele.soe - cfg.target_soe).as_kwh() * tele.charge_efficiency;
    if energy <= 0.0 {
        return ControlComponent::inactive(DISCHARGE_NAME);
    }
    let power = Power::kw(energy / hours);
    ControlComponent::active(DISCHARGE_NAME, Some(power), Some(power), None)
}
