#![allow(dead_code)]
//! The common currency every control strategy speaks: a named, optionally
//! active bound on battery power that the prioritiser merges down to a
//! single target.
use super::types::Power;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveComponent {
    pub target: Option<Power>,
    pub min: Option<Power>,
    pub max: Option<Power>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlComponent {
    pub name: &'static str,
    pub active: Option<ActiveComponent>,
}

impl ControlComponent {
    pub fn inactive(name: &'static str) -> Self {
        Self { name, active: None }
    }

    pub fn active(
        name: &'static str,
        target: Option<Power>,
        min: Option<Power>,
        max: Option<Power>,
    ) -> Self {
        if let (Some(min), Some(target), Some(max)) = (min, target, max) {
            debug_assert!(
                min.as_kw() <= target.as_kw() && target.as_kw() <= max.as_kw(),
                "strategy {name} produced an out-of-bounds component: {min} <= {target} <= {max}"
            );
        }
        Self {
            name,
            active: Some(ActiveComponent { target, min, max }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_component_has_no_bounds() {
        let c = ControlComponent::inactive("test");
        assert!(c.active.is_none());
    }

    #[test]
    fn active_component_carries_its_bounds() {
        let c = ControlComponent::active(
            "test",
            Some(Power::kw(1.0)),
            Some(Power::kw(0.0)),
            Some(Power::kw(2.0)),
        );
        let active = c.active.unwrap();
        assert_eq!(active.target, Some(Power::kw(1.0)));
    }
}
