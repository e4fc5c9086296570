//! Dynamic peak discharge: empties the battery across a configured peak
//! window, racing a deadline and optionally reserving headroom for
//! residual microgrid load.
use serde::{Deserialize, Serialize};

use crate::domain::component::ControlComponent;
use crate::domain::time::DayedPeriod;
use crate::domain::types::{Energy, InstantT, Power};
use crate::predictor::{DirectionalPredictionConfig, ImbalancePredictor, NivPredictionConfig};

use super::{import_avoidance_helper, Telemetry};

const NAME: &str = "dynamic_peak_discharge";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakDischargeConfig {
    pub peak_period: DayedPeriod,
    pub target_soe: Energy,
    pub max_discharge_rate: Power,
    pub short_prediction: DirectionalPredictionConfig,
    pub prioritise_residual_load: bool,
}

fn maximal_discharge() -> ControlComponent {
    ControlComponent::active(
        NAME,
        Some(Power::INFINITY),
        Some(Power::INFINITY),
        Some(Power::INFINITY),
    )
}

pub fn evaluate(
    t: InstantT,
    cfg: &PeakDischargeConfig,
    tele: &Telemetry,
    predictor: &ImbalancePredictor,
) -> ControlComponent {
    let Some(peak) = cfg.peak_period.absolutise(t) else {
        return ControlComponent::inactive(NAME);
    };

    let avail = (tele.soe - cfg.target_soe).as_kwh();
    if avail <= 0.0 {
        return ControlComponent::inactive(NAME);
    }

    let assumed_duration_to_empty_hours = avail / cfg.max_discharge_rate.as_kw();
    let deadline = peak
        .end
        .sub(chrono::Duration::milliseconds(
            (assumed_duration_to_empty_hours * 3_600_000.0) as i64,
        ));
    if t.duration_since(deadline) > chrono::Duration::zero() {
        return maximal_discharge();
    }

    let niv_cfg = NivPredictionConfig {
        when_short: cfg.short_prediction,
        when_long: DirectionalPredictionConfig {
            allow_prediction: false,
            volume_cutoff: Energy::ZERO,
            time_cutoff_secs: 0,
        },
    };
    let prediction = predictor.predict(t, &niv_cfg);

    match prediction {
        None => {
            if cfg.prioritise_residual_load {
                import_avoidance_helper(NAME, tele, false)
            } else {
                ControlComponent::inactive(NAME)
            }
        }
        Some(p) if p.volume.as_kwh() < 0.0 => {
            if cfg.prioritise_residual_load {
                import_avoidance_helper(NAME, tele, false)
            } else {
                ControlComponent::inactive(NAME)
            }
        }
        Some(_) => {
            if !cfg.prioritise_residual_load {
                return maximal_discharge();
            }
            let hours_to_end = peak.end.duration_since(t).num_milliseconds() as f64 / 3_600_000.0;
            let r = tele.site_power + tele.last_commanded_power;
            let reserve = r.as_kw() * hours_to_end;
            if avail > reserve {
                maximal_discharge()
            } else {
                import_avoidance_helper(NAME, tele, false)
            }
        }
    }
}
