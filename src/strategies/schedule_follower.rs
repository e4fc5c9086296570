//! Highest-priority strategy: directly follows the externally supplied
//! dispatch schedule.
use tracing::warn;

use crate::domain::component::ControlComponent;
use crate::domain::schedule::{Schedule, ScheduleAction};
use crate::domain::types::{InstantT, Power};

use super::{export_avoidance_helper, import_avoidance_helper, Telemetry};

const NAME: &str = "schedule_follower";

pub fn evaluate(t: InstantT, tele: &Telemetry, schedule: &Schedule) -> ControlComponent {
    let Some(item) = schedule.first_item_at(t) else {
        return ControlComponent::inactive(NAME);
    };

    match &item.action {
        ScheduleAction::ChargeMax => ControlComponent::active(
            NAME,
            Some(Power::NEG_INFINITY),
            Some(Power::NEG_INFINITY),
            Some(Power::NEG_INFINITY),
        ),
        ScheduleAction::DischargeMax => ControlComponent::active(
            NAME,
            Some(Power::INFINITY),
            Some(Power::INFINITY),
            Some(Power::INFINITY),
        ),
        ScheduleAction::AvoidImport => import_avoidance_helper(NAME, tele, true),
        ScheduleAction::AvoidExport => export_avoidance_helper(NAME, tele, true),
        ScheduleAction::DoNothing => ControlComponent::inactive(NAME),
        ScheduleAction::Unknown(tag) => {
            warn!(action = %tag, "schedule item carries an unrecognised action, ignoring");
            ControlComponent::inactive(NAME)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::ScheduleItem;
    use crate::domain::types::{Energy, MARKET_TZ};
    use chrono::TimeZone;

    fn london(h: u32, m: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, h, m, 0).unwrap())
    }

    fn tele() -> Telemetry {
        Telemetry {
            site_power: Power::kw(10.0),
            last_commanded_power: Power::ZERO,
            soe: Energy::kwh(100.0),
            charge_efficiency: 0.9,
        }
    }

    fn schedule_with(action: ScheduleAction) -> Schedule {
        Schedule::new(
            london(8, 0),
            vec![ScheduleItem {
                start: london(9, 0),
                end: london(10, 0),
                action,
                allow_deviation: false,
            }],
        )
    }

    #[test]
    fn charge_max_requests_infinite_charge() {
        let schedule = schedule_with(ScheduleAction::ChargeMax);
        let c = evaluate(london(9, 30), &tele(), &schedule);
        let active = c.active.unwrap();
        assert_eq!(active.target, Some(Power::NEG_INFINITY));
        assert_eq!(active.min, Some(Power::NEG_INFINITY));
        assert_eq!(active.max, Some(Power::NEG_INFINITY));
    }

    #[test]
    fn discharge_max_requests_infinite_discharge() {
        let schedule = schedule_with(ScheduleAction::DischargeMax);
        let c = evaluate(london(9, 30), &tele(), &schedule);
        assert_eq!(c.active.unwrap().target, Some(Power::INFINITY));
    }

    #[test]
    fn no_active_item_is_inactive() {
        let schedule = schedule_with(ScheduleAction::DoNothing);
        let c = evaluate(london(11, 0), &tele(), &schedule);
        assert!(c.active.is_none());
    }

    #[test]
    fn unknown_action_logs_and_is_inactive() {
        let schedule = schedule_with(ScheduleAction::Unknown("curtail".to_string()));
        let c = evaluate(london(9, 30), &tele(), &schedule);
        assert!(c.active.is_none());
    }
}
