//! Basic import/export avoidance (gated by a configured window) and the
//! short-NIV variant of import avoidance.
use serde::{Deserialize, Serialize};

use crate::domain::component::ControlComponent;
use crate::domain::time::DayedPeriod;
use crate::domain::types::InstantT;
use crate::predictor::{DirectionalPredictionConfig, ImbalancePredictor, NivPredictionConfig};

use super::{export_avoidance_helper, import_avoidance_helper, Telemetry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvoidancePeriodConfig {
    pub period: DayedPeriod,
}

const IMPORT_NAME: &str = "basic_import_avoidance";
const EXPORT_NAME: &str = "basic_export_avoidance";

pub fn evaluate_import_avoidance(
    t: InstantT,
    cfg: &AvoidancePeriodConfig,
    tele: &Telemetry,
) -> ControlComponent {
    if !cfg.period.contains(t) {
        return ControlComponent::inactive(IMPORT_NAME);
    }
    import_avoidance_helper(IMPORT_NAME, tele, true)
}

pub fn evaluate_export_avoidance(
    t: InstantT,
    cfg: &AvoidancePeriodConfig,
    tele: &Telemetry,
) -> ControlComponent {
    if !cfg.period.contains(t) {
        return ControlComponent::inactive(EXPORT_NAME);
    }
    export_avoidance_helper(EXPORT_NAME, tele, true)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAvoidanceWhenShortConfig {
    pub period: DayedPeriod,
    pub short_prediction: DirectionalPredictionConfig,
}

const WHEN_SHORT_NAME: &str = "import_avoidance_when_short";

/// Active only inside the configured period, and only when the predictor
/// (with the long side disabled) reports a short imbalance.
pub fn evaluate_import_avoidance_when_short(
    t: InstantT,
    cfg: &ImportAvoidanceWhenShortConfig,
    tele: &Telemetry,
    predictor: &ImbalancePredictor,
) -> ControlComponent {
    if !cfg.period.contains(t) {
        return ControlComponent::inactive(WHEN_SHORT_NAME);
    }
    let niv_cfg = NivPredictionConfig {
        when_short: cfg.short_prediction,
        when_long: DirectionalPredictionConfig {
            allow_prediction: false,
            volume_cutoff: crate::domain::types::Energy::ZERO,
            time_cutoff_secs: 0,
        },
    };
    match predictor.predict(t, &niv_cfg) {
        Some(p) if p.volume.as_kwh() > 0.0 => import_avoidance_helper(WHEN_SHORT_NAME, tele, true),
        _ => ControlComponent::inactive(WHEN_SHORT_NAME),
    }
}
