#![allow(dead_code)]
//! Clock-time, day-type and settlement-period arithmetic.
//!
//! Periods are expressed as clock-time + day-type + timezone tuples and
//! absolutised against a concrete instant only when needed. This keeps
//! daylight-saving transitions explicit and testable instead of baked
//! into whatever timezone the host process happens to run in.
use chrono::{Duration, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::InstantT;

/// Wall-clock time of day, with no date component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub tz: Tz,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32, tz: Tz) -> Self {
        Self {
            hour,
            minute,
            second,
            tz,
        }
    }

    fn seconds_of_day(&self) -> u32 {
        self.hour * 3600 + self.minute * 60 + self.second
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("clock time period end ({end:?}) must be after start ({start:?})")]
    EndBeforeStart { start: (u32, u32, u32), end: (u32, u32, u32) },
    #[error("clock time period start and end must share a timezone")]
    MismatchedTimezone,
}

/// A clock-time window, closed at `start` and open at `end`. Never crosses
/// midnight: `start` and `end` are on the same notional day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTimePeriod {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ClockTimePeriod {
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, PeriodError> {
        if start.tz != end.tz {
            return Err(PeriodError::MismatchedTimezone);
        }
        if start.seconds_of_day() >= end.seconds_of_day() {
            return Err(PeriodError::EndBeforeStart {
                start: (start.hour, start.minute, start.second),
                end: (end.hour, end.minute, end.second),
            });
        }
        Ok(Self { start, end })
    }

    /// Whether `t`, converted into this period's timezone, falls inside
    /// `[start, end)` on whatever day it lands on.
    pub fn contains_clock(&self, t: InstantT) -> bool {
        let local = t.in_tz(self.start.tz);
        let secs = local.hour() * 3600 + local.minute() * 60 + local.second();
        secs >= self.start.seconds_of_day() && secs < self.end.seconds_of_day()
    }
}

/// Day-of-week filter, bound to a named timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Days {
    All,
    Weekdays,
    Weekends,
}

impl Days {
    pub fn matches(&self, weekday: Weekday) -> bool {
        let is_weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        match self {
            Days::All => true,
            Days::Weekdays => !is_weekend,
            Days::Weekends => is_weekend,
        }
    }
}

/// A clock-time window plus the days of the week it applies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayedPeriod {
    pub period: ClockTimePeriod,
    pub days: Days,
}

impl DayedPeriod {
    pub fn new(period: ClockTimePeriod, days: Days) -> Self {
        Self { period, days }
    }

    /// True iff `t` falls on a matching day and inside the clock-time
    /// window, both evaluated after converting `t` into the period's zone.
    pub fn contains(&self, t: InstantT) -> bool {
        let local = t.in_tz(self.period.start.tz);
        self.days.matches(local.weekday()) && self.period.contains_clock(t)
    }

    /// Absolutises this period against `t`'s local day, iff `contains(t)`.
    pub fn absolutise(&self, t: InstantT) -> Option<AbsolutePeriod> {
        if !self.contains(t) {
            return None;
        }
        let local = t.in_tz(self.period.start.tz);
        let date = local.date_naive();
        let tz = self.period.start.tz;
        let start = date
            .and_hms_opt(
                self.period.start.hour,
                self.period.start.minute,
                self.period.start.second,
            )?
            .and_local_timezone(tz)
            .single()?;
        let end = date
            .and_hms_opt(
                self.period.end.hour,
                self.period.end.minute,
                self.period.end.second,
            )?
            .and_local_timezone(tz)
            .single()?;
        Some(AbsolutePeriod {
            start: InstantT(start),
            end: InstantT(end),
        })
    }
}

/// A concrete, dated window of absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsolutePeriod {
    pub start: InstantT,
    pub end: InstantT,
}

impl AbsolutePeriod {
    pub fn contains(&self, t: InstantT) -> bool {
        t >= self.start && t < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start)
    }
}

/// Settlement period length: 30 minutes, beginning at :00 or :30.
pub const SETTLEMENT_PERIOD: Duration = Duration::minutes(30);

/// The settlement-period start containing `t`, in the market timezone.
pub fn floor_hh(t: InstantT) -> InstantT {
    let local = t.in_tz(super::types::MARKET_TZ);
    let minute = if local.minute() < 30 { 0 } else { 30 };
    let floored = local
        .date_naive()
        .and_hms_opt(local.hour(), minute, 0)
        .expect("valid hour/minute")
        .and_local_timezone(super::types::MARKET_TZ)
        .single()
        .expect("unambiguous settlement-period boundary");
    InstantT(floored)
}

/// Time remaining until the end of the settlement period containing `t`.
pub fn duration_left_of_sp(t: InstantT) -> Duration {
    let sp_start = floor_hh(t);
    SETTLEMENT_PERIOD - t.duration_since(sp_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MARKET_TZ;
    use chrono::TimeZone;

    fn london(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(y, m, d, h, min, s).unwrap())
    }

    #[test]
    fn floor_hh_is_idempotent_and_bounds_t() {
        let t = london(2023, 9, 12, 9, 17, 42);
        let floored = floor_hh(t);
        assert_eq!(floor_hh(floored), floored);
        assert!(floored <= t);
        assert!(t < floored.add(SETTLEMENT_PERIOD));
    }

    #[test]
    fn floor_hh_picks_the_half_hour_boundary() {
        let t = london(2023, 9, 12, 9, 31, 0);
        let floored = floor_hh(t);
        assert_eq!(floored.in_tz(MARKET_TZ).minute(), 30);
    }

    #[test]
    fn duration_left_of_sp_is_in_range() {
        let t = london(2023, 9, 12, 9, 0, 4);
        let left = duration_left_of_sp(t);
        assert!(left > Duration::zero());
        assert!(left <= SETTLEMENT_PERIOD);
    }

    #[test]
    fn clock_time_period_rejects_end_before_start() {
        let start = ClockTime::new(10, 0, 0, MARKET_TZ);
        let end = ClockTime::new(9, 0, 0, MARKET_TZ);
        assert!(ClockTimePeriod::new(start, end).is_err());
    }

    #[test]
    fn dayed_period_absolutise_iff_contains() {
        let period = ClockTimePeriod::new(
            ClockTime::new(9, 0, 0, MARKET_TZ),
            ClockTime::new(10, 0, 0, MARKET_TZ),
        )
        .unwrap();
        let dayed = DayedPeriod::new(period, Days::Weekdays);

        // Tuesday 09:00:04 -> inside window and a weekday.
        let t_in = london(2023, 9, 12, 9, 0, 4);
        assert!(dayed.contains(t_in));
        assert!(dayed.absolutise(t_in).is_some());

        // Saturday at the same clock time -> weekend, excluded.
        let t_weekend = london(2023, 9, 9, 9, 0, 6);
        assert!(!dayed.contains(t_weekend));
        assert!(dayed.absolutise(t_weekend).is_none());

        // Tuesday but outside the clock window.
        let t_outside = london(2023, 9, 12, 11, 0, 0);
        assert!(!dayed.contains(t_outside));
        assert!(dayed.absolutise(t_outside).is_none());
    }

    #[test]
    fn days_matches_weekday_classes() {
        assert!(Days::All.matches(Weekday::Sat));
        assert!(!Days::Weekdays.matches(Weekday::Sun));
        assert!(Days::Weekends.matches(Weekday::Sun));
        assert!(!Days::Weekends.matches(Weekday::Mon));
    }
}
