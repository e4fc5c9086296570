//! Dynamic peak approach: charges ahead of a peak window so the battery
//! reaches a target SoE by the time the peak begins, with an optional
//! softer "encourage" target brought forward when the predictor expects a
//! long imbalance.
use serde::{Deserialize, Serialize};

use crate::domain::component::ControlComponent;
use crate::domain::time::{duration_left_of_sp, DayedPeriod};
use crate::domain::types::{Energy, InstantT, Power};
use crate::predictor::{DirectionalPredictionConfig, ImbalancePredictor, NivPredictionConfig};

use super::Telemetry;

const NAME: &str = "dynamic_peak_approach";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakApproachConfig {
    pub peak_period: DayedPeriod,
    pub to_soe: Energy,
    pub encourage_to_soe: Option<Energy>,
    pub assumed_charge_power: Power,
    pub force_charge_duration_factor: f64,
    pub encourage_charge_duration_factor: f64,
    pub charge_cushion_minutes: i64,
    pub long_prediction: DirectionalPredictionConfig,
}

fn required_hours(energy_kwh: f64, assumed_power_kw: f64, factor: f64, cushion_hours: f64) -> f64 {
    (energy_kwh / assumed_power_kw).max(0.0) * factor + cushion_hours
}

fn charge_component(t: InstantT, energy_kwh: f64) -> ControlComponent {
    let hours_left = duration_left_of_sp(t).num_milliseconds() as f64 / 3_600_000.0;
    let target = Power::kw(-energy_kwh / hours_left);
    ControlComponent::active(NAME, Some(target), None, Some(target))
}

pub fn evaluate(
    t: InstantT,
    cfg: &PeakApproachConfig,
    tele: &Telemetry,
    predictor: &ImbalancePredictor,
) -> ControlComponent {
    if !cfg.peak_period.contains(t) {
        return ControlComponent::inactive(NAME);
    }
    let Some(peak) = cfg.peak_period.absolutise(t) else {
        return ControlComponent::inactive(NAME);
    };
    let hours_to_peak = peak.end.duration_since(t).num_milliseconds() as f64 / 3_600_000.0;
    let cushion_hours = cfg.charge_cushion_minutes as f64 / 60.0;

    let force_energy = ((cfg.to_soe - tele.soe).as_kwh() / tele.charge_efficiency).max(0.0);
    if force_energy > 0.0 {
        let required = required_hours(
            force_energy,
            cfg.assumed_charge_power.as_kw(),
            cfg.force_charge_duration_factor,
            cushion_hours,
        );
        if hours_to_peak <= required {
            return charge_component(t, force_energy);
        }
    }

    if let Some(encourage_to_soe) = cfg.encourage_to_soe {
        let niv_cfg = NivPredictionConfig {
            when_short: DirectionalPredictionConfig {
                allow_prediction: false,
                volume_cutoff: Energy::ZERO,
                time_cutoff_secs: 0,
            },
            when_long: cfg.long_prediction,
        };
        let is_long = matches!(predictor.predict(t, &niv_cfg), Some(p) if p.volume.as_kwh() < 0.0);
        if is_long {
            let encourage_energy =
                ((encourage_to_soe - tele.soe).as_kwh() / tele.charge_efficiency).max(0.0);
            if encourage_energy > 0.0 {
                let required = required_hours(
                    encourage_energy,
                    cfg.assumed_charge_power.as_kw(),
                    cfg.encourage_charge_duration_factor,
                    cushion_hours,
                );
                if hours_to_peak <= required {
                    return charge_component(t, encourage_energy);
                }
            }
        }
    }

    ControlComponent::inactive(NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::{ClockTime, ClockTimePeriod, Days};
    use crate::domain::types::MARKET_TZ;
    use chrono::TimeZone;

    fn london(h: u32, m: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, h, m, 0).unwrap())
    }

    fn cfg() -> PeakApproachConfig {
        PeakApproachConfig {
            peak_period: DayedPeriod::new(
                ClockTimePeriod::new(
                    ClockTime::new(14, 0, 0, MARKET_TZ),
                    ClockTime::new(16, 0, 0, MARKET_TZ),
                )
                .unwrap(),
                Days::All,
            ),
            to_soe: Energy::kwh(150.0),
            encourage_to_soe: Some(Energy::kwh(170.0)),
            assumed_charge_power: Power::kw(30.0),
            force_charge_duration_factor: 1.2,
            encourage_charge_duration_factor: 1.5,
            charge_cushion_minutes: 10,
            long_prediction: DirectionalPredictionConfig {
                allow_prediction: true,
                volume_cutoff: Energy::kwh(0.0),
                time_cutoff_secs: 30 * 60,
            },
        }
    }

    fn tele(soe: f64) -> Telemetry {
        Telemetry {
            site_power: Power::kw(5.0),
            last_commanded_power: Power::ZERO,
            soe: Energy::kwh(soe),
            charge_efficiency: 0.9,
        }
    }

    #[test]
    fn force_mode_kicks_in_near_the_deadline() {
        let predictor = ImbalancePredictor::new();
        // force_energy = (150-100)/0.9 = 55.5; required = 55.5/30*1.2 + cushion ~= 2.22h + 0.167h.
        let c = evaluate(london(15, 50), &cfg(), &tele(100.0), &predictor);
        assert!(c.active.is_some());
        assert!(c.active.unwrap().target.unwrap().as_kw() < 0.0);
    }

    #[test]
    fn inactive_well_ahead_of_the_deadline_with_no_long_signal() {
        let predictor = ImbalancePredictor::new();
        let c = evaluate(london(14, 5), &cfg(), &tele(148.0), &predictor);
        assert!(c.active.is_none());
    }

    #[test]
    fn inactive_outside_the_peak_period() {
        let predictor = ImbalancePredictor::new();
        let c = evaluate(london(10, 0), &cfg(), &tele(100.0), &predictor);
        assert!(c.active.is_none());
    }
}
