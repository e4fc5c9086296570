#![allow(dead_code)]
//! Merges the ordered list of control components down to a single raw
//! power request, honouring the rule that a higher-priority component's
//! bound may leave a lower-priority component free to pick its own
//! target within the resulting envelope.
use tracing::warn;

use crate::domain::component::ControlComponent;
use crate::domain::types::Power;

#[derive(Debug, Clone, Default)]
pub struct PrioritiserDiagnostics {
    pub contributed_target: Vec<&'static str>,
    pub contributed_min: Vec<&'static str>,
    pub contributed_max: Vec<&'static str>,
    pub dropped_min: Vec<&'static str>,
    pub dropped_max: Vec<&'static str>,
    pub idle: bool,
}

/// Running-bounds merge of §4.3. `min`/`max` are only ever tightened, and
/// only accepted if they don't contradict a target already committed.
pub fn prioritise(components: &[ControlComponent]) -> (Power, PrioritiserDiagnostics) {
    let mut power: Option<f64> = None;
    let mut min_p: Option<f64> = None;
    let mut max_p: Option<f64> = None;
    let mut diagnostics = PrioritiserDiagnostics::default();

    for component in components {
        let Some(active) = &component.active else {
            continue;
        };

        if let Some(target) = active.target {
            let within_min = min_p.map(|m| target.as_kw() >= m).unwrap_or(true);
            let within_max = max_p.map(|m| target.as_kw() <= m).unwrap_or(true);
            if within_min && within_max {
                power = Some(target.as_kw());
                diagnostics.contributed_target.push(component.name);
            }
        }

        if let Some(min) = active.min {
            let is_tighter = min_p.map(|m| min.as_kw() > m).unwrap_or(true);
            if is_tighter {
                let acceptable = power.map(|p| min.as_kw() <= p).unwrap_or(true);
                if acceptable {
                    min_p = Some(min.as_kw());
                    diagnostics.contributed_min.push(component.name);
                } else {
                    warn!(
                        component = component.name,
                        min = min.as_kw(),
                        power,
                        "dropping min bound that contradicts the committed target"
                    );
                    diagnostics.dropped_min.push(component.name);
                }
            }
        }

        if let Some(max) = active.max {
            let is_tighter = max_p.map(|m| max.as_kw() < m).unwrap_or(true);
            if is_tighter {
                let acceptable = power.map(|p| max.as_kw() >= p).unwrap_or(true);
                if acceptable {
                    max_p = Some(max.as_kw());
                    diagnostics.contributed_max.push(component.name);
                } else {
                    warn!(
                        component = component.name,
                        max = max.as_kw(),
                        power,
                        "dropping max bound that contradicts the committed target"
                    );
                    diagnostics.dropped_max.push(component.name);
                }
            }
        }
    }

    match power {
        Some(p) => (Power::kw(p), diagnostics),
        None => {
            diagnostics.idle = true;
            (Power::ZERO, diagnostics)
        }
    }
}
