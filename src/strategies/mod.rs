#![allow(dead_code)]
//! The nine control components. Each strategy is a pure function: given
//! the current instant, its own configuration slice, a read-only
//! telemetry snapshot, the imbalance predictor and the active schedule,
//! it returns one `ControlComponent` for the prioritiser to merge.
pub mod avoidance;
pub mod niv_chase;
pub mod peak_approach;
pub mod peak_discharge;
pub mod schedule_follower;
pub mod soe_target;

use crate::domain::component::ControlComponent;
use crate::domain::types::{Energy, Power};

/// Read-only slice of controller state a strategy needs. Strategies never
/// see the full `ControllerState`, only this snapshot, so they cannot
/// accidentally depend on anything outside their documented inputs.
#[derive(Debug, Clone, Copy)]
pub struct Telemetry {
    pub site_power: Power,
    pub last_commanded_power: Power,
    pub soe: Energy,
    pub charge_efficiency: f64,
}

/// `iaPower = sitePower + lastCommandedPower`, the underlying microgrid
/// load estimate with the battery's own effect removed.
fn estimated_underlying_load(tele: &Telemetry) -> Power {
    tele.site_power + tele.last_commanded_power
}

/// Shared by the schedule follower, basic import avoidance and
/// import-avoidance-when-short: forbids the site from importing net
/// power, optionally leaving room for a lower-priority discharge.
pub(crate) fn import_avoidance_helper(
    name: &'static str,
    tele: &Telemetry,
    allow_more_discharge: bool,
) -> ControlComponent {
    let ia_power = estimated_underlying_load(tele);
    if ia_power.as_kw() < 0.0 {
        ControlComponent::active(name, None, Some(ia_power), None)
    } else {
        let max = if allow_more_discharge {
            None
        } else {
            Some(ia_power)
        };
        ControlComponent::active(name, Some(ia_power), Some(ia_power), max)
    }
}

/// Symmetric about sign: forbids the site from exporting net power.
pub(crate) fn export_avoidance_helper(
    name: &'static str,
    tele: &Telemetry,
    allow_more_charge: bool,
) -> ControlComponent {
    let ea_power = estimated_underlying_load(tele);
    if ea_power.as_kw() > 0.0 {
        ControlComponent::active(name, None, None, Some(ea_power))
    } else {
        let min = if allow_more_charge {
            None
        } else {
            Some(ea_power)
        };
        ControlComponent::active(name, Some(ea_power), min, Some(ea_power))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tele(site_power: f64, last: f64) -> Telemetry {
        Telemetry {
            site_power: Power::kw(site_power),
            last_commanded_power: Power::kw(last),
            soe: Energy::kwh(100.0),
            charge_efficiency: 0.9,
        }
    }

    #[test]
    fn import_avoidance_forbids_creating_an_import() {
        let c = import_avoidance_helper("ia", &tele(-5.0, 0.0), true);
        let active = c.active.unwrap();
        assert_eq!(active.min, Some(Power::kw(-5.0)));
        assert_eq!(active.target, None);
        assert_eq!(active.max, None);
    }

    #[test]
    fn import_avoidance_pins_target_when_already_importing() {
        let c = import_avoidance_helper("ia", &tele(25.0, 0.0), true);
        let active = c.active.unwrap();
        assert_eq!(active.target, Some(Power::kw(25.0)));
        assert_eq!(active.min, Some(Power::kw(25.0)));
        assert_eq!(active.max, None);
    }

    #[test]
    fn import_avoidance_pins_max_when_discharge_not_allowed() {
        let c = import_avoidance_helper("ia", &tele(25.0, 0.0), false);
        let active = c.active.unwrap();
        assert_eq!(active.max, Some(Power::kw(25.0)));
    }

    #[test]
    fn export_avoidance_is_symmetric() {
        let c = export_avoidance_helper("ea", &tele(-15.0, 0.0), true);
        let active = c.active.unwrap();
        assert_eq!(active.target, Some(Power::kw(-15.0)));
        assert_eq!(active.max, Some(Power::kw(-15.0)));
        assert_eq!(active.min, None);
    }
}
