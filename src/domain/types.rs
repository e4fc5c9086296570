#![allow(dead_code)]
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// The market timezone settlement periods and day-type classification are
/// computed in. Concrete scenarios in the specification are all expressed
/// in this zone.
pub const MARKET_TZ: Tz = chrono_tz::Europe::London;

/// An absolute, timezone-aware instant.
///
/// Wrapping `DateTime<Tz>` rather than `DateTime<Utc>` keeps the host
/// process's timezone out of control decisions: settlement-period and
/// day-type arithmetic always happens after an explicit conversion into
/// the zone a period names, never implicitly in system-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstantT(pub DateTime<Tz>);

impl InstantT {
    pub fn now_in(tz: Tz) -> Self {
        Self(chrono::Utc::now().with_timezone(&tz))
    }

    pub fn in_tz(&self, tz: Tz) -> DateTime<Tz> {
        self.0.with_timezone(&tz)
    }

    pub fn add(&self, d: chrono::Duration) -> Self {
        Self(self.0 + d)
    }

    pub fn sub(&self, d: chrono::Duration) -> Self {
        Self(self.0 - d)
    }

    pub fn duration_since(&self, other: Self) -> chrono::Duration {
        self.0 - other.0
    }

    pub fn weekday(&self) -> chrono::Weekday {
        self.0.weekday()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }
}

impl From<DateTime<Tz>> for InstantT {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for InstantT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%:z"))
    }
}

/// Opaque stable identifier for a meter, battery or other telemetry source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Signed power in kilowatts.
///
/// Sign convention (asserted at every external boundary): positive means
/// the battery is discharging, or equivalently the site is importing;
/// negative means the battery is charging, or the site is exporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Power(pub f64);

impl Power {
    pub const ZERO: Power = Power(0.0);
    pub const INFINITY: Power = Power(f64::INFINITY);
    pub const NEG_INFINITY: Power = Power(f64::NEG_INFINITY);

    pub fn kw(v: f64) -> Self {
        Self(v)
    }

    pub fn as_kw(&self) -> f64 {
        self.0
    }

    pub fn clamp(&self, lo: Power, hi: Power) -> Power {
        Power(self.0.clamp(lo.0, hi.0))
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Power {
    type Output = Power;
    fn add(self, rhs: Power) -> Power {
        Power(self.0 + rhs.0)
    }
}

impl Sub for Power {
    type Output = Power;
    fn sub(self, rhs: Power) -> Power {
        Power(self.0 - rhs.0)
    }
}

impl Neg for Power {
    type Output = Power;
    fn neg(self) -> Power {
        Power(-self.0)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} kW", self.0)
    }
}

/// Battery state-of-energy in kilowatt-hours, absolute (not a percentage).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Energy(pub f64);

impl Energy {
    pub const ZERO: Energy = Energy(0.0);

    pub fn kwh(v: f64) -> Self {
        Self(v)
    }

    pub fn as_kwh(&self) -> f64 {
        self.0
    }
}

impl Add for Energy {
    type Output = Energy;
    fn add(self, rhs: Energy) -> Energy {
        Energy(self.0 + rhs.0)
    }
}

impl Sub for Energy {
    type Output = Energy;
    fn sub(self, rhs: Energy) -> Energy {
        Energy(self.0 - rhs.0)
    }
}

impl Neg for Energy {
    type Output = Energy;
    fn neg(self) -> Energy {
        Energy(-self.0)
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

/// Pence per kWh, applied to boundary import/export flows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Rate(pub f64);

impl Rate {
    pub const ZERO: Rate = Rate(0.0);

    pub fn pence_per_kwh(v: f64) -> Self {
        Self(v)
    }

    pub fn as_pence_per_kwh(&self) -> f64 {
        self.0
    }

    /// Derive an imbalance price in pence/kWh from a published £/MWh value.
    pub fn from_gbp_per_mwh(gbp_per_mwh: f64) -> Self {
        Self(gbp_per_mwh / 10.0)
    }
}

impl Add for Rate {
    type Output = Rate;
    fn add(self, rhs: Rate) -> Rate {
        Rate(self.0 + rhs.0)
    }
}

impl Sub for Rate {
    type Output = Rate;
    fn sub(self, rhs: Rate) -> Rate {
        Rate(self.0 - rhs.0)
    }
}

impl Mul<Energy> for Rate {
    type Output = f64; // pence
    fn mul(self, energy: Energy) -> f64 {
        self.0 * energy.as_kwh()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} p/kWh", self.0)
    }
}
