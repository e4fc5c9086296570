#![allow(dead_code)]
//! The externally-supplied dispatch schedule: a sequence of timed actions
//! the schedule-follower strategy turns into a power target.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

use super::types::InstantT;

/// What the schedule wants the battery to do during an item's window.
///
/// Unknown tags deserialize to `Unknown` rather than failing, so an
/// optimiser rolling out a new action ahead of this core doesn't take the
/// whole schedule down; the follower logs and treats it as inactive.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleAction {
    ChargeMax,
    DischargeMax,
    AvoidImport,
    AvoidExport,
    DoNothing,
    #[strum(default)]
    Unknown(String),
}

impl Serialize for ScheduleAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScheduleAction::Unknown(tag) => serializer.serialize_str(tag),
            known => serializer.serialize_str(&known.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(tag.parse().unwrap_or_else(|_| ScheduleAction::Unknown(tag)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub start: InstantT,
    pub end: InstantT,
    pub action: ScheduleAction,
    pub allow_deviation: bool,
}

impl ScheduleItem {
    pub fn contains(&self, t: InstantT) -> bool {
        t >= self.start && t < self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Schedule {
    pub received_at: Option<InstantT>,
    pub items: Vec<ScheduleItem>,
}

impl Schedule {
    pub fn new(received_at: InstantT, items: Vec<ScheduleItem>) -> Self {
        Self {
            received_at: Some(received_at),
            items,
        }
    }

    /// The first item (in list order) whose window contains `t`, if any.
    pub fn first_item_at(&self, t: InstantT) -> Option<&ScheduleItem> {
        self.items.iter().find(|item| item.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MARKET_TZ;
    use chrono::TimeZone;

    fn london(h: u32, m: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, h, m, 0).unwrap())
    }

    #[test]
    fn first_item_at_picks_the_containing_window() {
        let schedule = Schedule::new(
            london(8, 0),
            vec![
                ScheduleItem {
                    start: london(8, 0),
                    end: london(9, 0),
                    action: ScheduleAction::ChargeMax,
                    allow_deviation: false,
                },
                ScheduleItem {
                    start: london(9, 0),
                    end: london(10, 0),
                    action: ScheduleAction::DischargeMax,
                    allow_deviation: true,
                },
            ],
        );

        assert_eq!(
            schedule.first_item_at(london(9, 30)).unwrap().action,
            ScheduleAction::DischargeMax
        );
        assert!(schedule.first_item_at(london(10, 30)).is_none());
    }

    #[test]
    fn unknown_action_round_trips_as_a_string() {
        let json = r#""curtail_reactive""#;
        let action: ScheduleAction = serde_json::from_str(json).unwrap();
        assert_eq!(action, ScheduleAction::Unknown("curtail_reactive".to_string()));
    }
}
