#![allow(dead_code)]
//! Telemetry value objects produced by the meter and battery drivers.
//!
//! Only `MeterReading::power_total_active` and the battery's SoE/target
//! power are consumed by the control core; every other field is carried
//! through untouched for forwarding to sinks (the SQLite-buffered
//! uploader, out of scope here).
use serde::{Deserialize, Serialize};

use super::types::{DeviceId, Energy, InstantT, Power};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingMeta {
    pub reading_id: u64,
    pub device_id: DeviceId,
    pub timestamp: InstantT,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterReading {
    pub meta: ReadingMeta,
    pub power_total_active: Power,
    pub frequency_hz: Option<f64>,
    pub power_per_phase: Option<[Power; 3]>,
    pub reactive_power_total: Option<f64>,
    pub apparent_power_total: Option<f64>,
    pub current_per_phase: Option<[f64; 3]>,
    pub voltage_line_avg: Option<f64>,
    pub power_factor: Option<f64>,
    pub energy_imported_kwh: Option<f64>,
    pub energy_exported_kwh: Option<f64>,
}

impl MeterReading {
    /// A minimally-populated reading, useful for simulated drivers and
    /// tests that only care about the boundary power flow.
    pub fn minimal(meta: ReadingMeta, power_total_active: Power) -> Self {
        Self {
            meta,
            power_total_active,
            frequency_hz: None,
            power_per_phase: None,
            reactive_power_total: None,
            apparent_power_total: None,
            current_per_phase: None,
            voltage_line_avg: None,
            power_factor: None,
            energy_imported_kwh: None,
            energy_exported_kwh: None,
        }
    }
}

/// Who most recently set the battery's target power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSource {
    Controller,
    Manual,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryReading {
    pub meta: ReadingMeta,
    pub soe: Energy,
    pub last_target_power: Power,
    pub available_inverter_blocks: Option<u32>,
    pub command_source: CommandSource,
}

/// The command emitted to the battery driver once per tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BatteryCommand {
    pub target: Power,
}

impl BatteryCommand {
    pub fn new(target: Power) -> Self {
        Self { target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MARKET_TZ;
    use chrono::TimeZone;

    #[test]
    fn minimal_meter_reading_leaves_optional_fields_empty() {
        let meta = ReadingMeta {
            reading_id: 1,
            device_id: DeviceId::from("meter-1"),
            timestamp: InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, 9, 0, 0).unwrap()),
        };
        let reading = MeterReading::minimal(meta, Power::kw(12.5));
        assert_eq!(reading.power_total_active.as_kw(), 12.5);
        assert!(reading.frequency_hz.is_none());
        assert!(reading.energy_imported_kwh.is_none());
    }
}
