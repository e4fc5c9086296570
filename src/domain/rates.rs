#![allow(dead_code)]
//! Per-kWh import/export rate schedules indexed by time-of-day and
//! day-type, such as DUoS bands. A `RateTable` answers "what is the sum
//! of all rates that apply right now?".
use serde::{Deserialize, Serialize};

use super::time::DayedPeriod;
use super::types::{InstantT, Rate};

/// A single rate that applies during any of `periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedRate {
    pub rate: Rate,
    pub periods: Vec<DayedPeriod>,
}

impl TimedRate {
    pub fn applies_at(&self, t: InstantT) -> bool {
        self.periods.iter().any(|p| p.contains(t))
    }
}

/// An ordered collection of timed rates; the point-in-time query sums
/// every rate whose period currently applies (bands are additive, e.g.
/// DUoS plus a supplier charge stacking in the same window).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: Vec<TimedRate>,
}

impl RateTable {
    pub fn new(rates: Vec<TimedRate>) -> Self {
        Self { rates }
    }

    pub fn sum_at(&self, t: InstantT) -> Rate {
        self.rates
            .iter()
            .filter(|r| r.applies_at(t))
            .fold(Rate::ZERO, |acc, r| acc + r.rate)
    }
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

    fn dayed(start: (u32, u32), end: (u32, u32), days: Days) -> DayedPeriod {
        let period = ClockTimePeriod::new(
            ClockTime::new(start.0, start.1, 0, MARKET_TZ),
            ClockTime::new(end.0, end.1, 0, MARKET_TZ),
        )
        .unwrap();
        DayedPeriod::new(period, days)
    }

    #[test]
    fn sums_overlapping_bands() {
        let table = RateTable::new(vec![
            TimedRate {
                rate: Rate::pence_per_kwh(10.0),
                periods: vec![dayed((8, 0), (12, 0), Days::Weekdays)],
            },
            TimedRate {
                rate: Rate::pence_per_kwh(4.0),
                periods: vec![dayed((9, 0), (10, 0), Days::Weekdays)],
            },
        ]);

        assert_eq!(table.sum_at(london(9, 30)).as_pence_per_kwh(), 14.0);
        assert_eq!(table.sum_at(london(8, 30)).as_pence_per_kwh(), 10.0);
        assert_eq!(table.sum_at(london(13, 0)).as_pence_per_kwh(), 0.0);
    }

    #[test]
    fn empty_table_sums_to_zero() {
        let table = RateTable::default();
        assert_eq!(table.sum_at(london(9, 30)), Rate::ZERO);
    }
}
