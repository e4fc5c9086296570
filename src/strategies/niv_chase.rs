//! NIV chase: greedily follows the predicted imbalance price using a pair
//! of charge/discharge willingness curves in (price, SoE) space.
use serde::{Deserialize, Serialize};

use crate::domain::component::ControlComponent;
use crate::domain::curve::Curve;
use crate::domain::rates::RateTable;
use crate::domain::time::{duration_left_of_sp, DayedPeriod};
use crate::domain::types::{InstantT, Power, Rate};
use crate::predictor::{ImbalancePredictor, NivPredictionConfig};

use super::Telemetry;

const NAME: &str = "niv_chase";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NivChaseConfig {
    pub period: DayedPeriod,
    pub prediction: NivPredictionConfig,
    pub default_pricing: RateTable,
    pub curve_shift_long: Rate,
    pub curve_shift_short: Rate,
    pub charge_curve: Curve,
    pub discharge_curve: Curve,
    pub rates_import: RateTable,
    pub rates_export: RateTable,
}

pub fn evaluate(
    t: InstantT,
    cfg: &NivChaseConfig,
    tele: &Telemetry,
    predictor: &ImbalancePredictor,
) -> ControlComponent {
    if !cfg.period.contains(t) {
        return ControlComponent::inactive(NAME);
    }

    let (price, volume) = match predictor.predict(t, &cfg.prediction) {
        Some(p) => (p.price, Some(p.volume.as_kwh())),
        None => {
            let default = cfg.default_pricing.sum_at(t);
            if default == Rate::ZERO {
                return ControlComponent::inactive(NAME);
            }
            (default, None)
        }
    };

    let rates_import = cfg.rates_import.sum_at(t);
    let rates_export = cfg.rates_export.sum_at(t);
    let charge_price = price + rates_import;
    let discharge_price = price - rates_export;

    let shift = match volume {
        Some(v) if v < 0.0 => -cfg.curve_shift_long.as_pence_per_kwh(),
        Some(v) if v > 0.0 => cfg.curve_shift_short.as_pence_per_kwh(),
        _ => 0.0,
    };
    let shifted_charge_price = charge_price.as_pence_per_kwh() + shift;
    let shifted_discharge_price = discharge_price.as_pence_per_kwh() + shift;

    let soe = tele.soe.as_kwh();
    let charge_distance = cfg
        .charge_curve
        .vertical_distance((shifted_charge_price, soe));
    let discharge_distance = cfg
        .discharge_curve
        .vertical_distance((shifted_discharge_price, soe));

    let energy_delta = if charge_distance.map(|d| d > 0.0).unwrap_or(false) {
        -charge_distance.unwrap() / tele.charge_efficiency
    } else if discharge_distance.map(|d| d < 0.0).unwrap_or(false) {
        -discharge_distance.unwrap()
    } else {
        0.0
    };

    if energy_delta == 0.0 {
        return ControlComponent::inactive(NAME);
    }

    let hours_left = duration_left_of_sp(t).num_milliseconds() as f64 / 3_600_000.0;
    let target = Power::kw(energy_delta / hours_left);
    ControlComponent::active(NAME, Some(target), Some(target), Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::{ClockTime, ClockTimePeriod, Days};
    use crate::domain::types::{Energy, MARKET_TZ};
    use chrono::TimeZone;

    fn london(h: u32, m: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, h, m, 0).unwrap())
    }

    fn cfg() -> NivChaseConfig {
        NivChaseConfig {
            period: DayedPeriod::new(
                ClockTimePeriod::new(
                    ClockTime::new(23, 0, 0, MARKET_TZ),
                    ClockTime::new(23, 59, 0, MARKET_TZ),
                )
                .unwrap(),
                Days::All,
            ),
            prediction: NivPredictionConfig {
                when_short: crate::predictor::DirectionalPredictionConfig {
                    allow_prediction: true,
                    volume_cutoff: Energy::kwh(0.0),
                    time_cutoff_secs: 30 * 60,
                },
                when_long: crate::predictor::DirectionalPredictionConfig {
                    allow_prediction: true,
                    volume_cutoff: Energy::kwh(0.0),
                    time_cutoff_secs: 30 * 60,
                },
            },
            default_pricing: RateTable::default(),
            curve_shift_long: Rate::ZERO,
            curve_shift_short: Rate::ZERO,
            charge_curve: Curve::new(vec![(-9999.0, 180.0), (0.0, 180.0), (20.0, 0.0)]).unwrap(),
            discharge_curve: Curve::new(vec![(30.0, 180.0), (40.0, 0.0), (9999.0, 0.0)]).unwrap(),
            rates_import: RateTable::new(vec![crate::domain::rates::TimedRate {
                rate: Rate::pence_per_kwh(10.0),
                periods: vec![DayedPeriod::new(
                    ClockTimePeriod::new(
                        ClockTime::new(0, 0, 0, MARKET_TZ),
                        ClockTime::new(23, 59, 59, MARKET_TZ),
                    )
                    .unwrap(),
                    Days::All,
                )],
            }]),
            rates_export: RateTable::new(vec![crate::domain::rates::TimedRate {
                rate: Rate::pence_per_kwh(10.0),
                periods: vec![DayedPeriod::new(
                    ClockTimePeriod::new(
                        ClockTime::new(0, 0, 0, MARKET_TZ),
                        ClockTime::new(23, 59, 59, MARKET_TZ),
                    )
                    .unwrap(),
                    Days::All,
                )],
            }]),
        }
    }

    fn tele() -> Telemetry {
        Telemetry {
            site_power: Power::kw(-10.0),
            last_commanded_power: Power::ZERO,
            soe: Energy::kwh(100.0),
            charge_efficiency: 0.9,
        }
    }

    #[test]
    fn greedy_discharge_on_high_price_matches_the_worked_scenario() {
        let predictor = ImbalancePredictor::new();
        let sp = london(23, 0);
        predictor.observe_price(Rate::pence_per_kwh(60.0), sp);
        predictor.observe_volume(Energy::kwh(1.0), sp);

        let c = evaluate(london(23, 10), &cfg(), &tele(), &predictor);
        let active = c.active.unwrap();
        // discharge_price = 60 - 10 = 50, past the curve's ramp (flat at
        // zero from x=40), so vertical_distance(50, soe=100) = 0 - 100 =
        // -100: a strongly negative distance, driving a greedy discharge.
        assert!(active.target.unwrap().as_kw() > 0.0);
    }

    #[test]
    fn inactive_outside_configured_window() {
        let predictor = ImbalancePredictor::new();
        let c = evaluate(london(10, 0), &cfg(), &tele(), &predictor);
        assert!(c.active.is_none());
    }
}
