use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, warn};

use crate::domain::readings::{BatteryCommand, BatteryReading, CommandSource, ReadingMeta};
use crate::domain::types::{DeviceId, Energy, InstantT, MARKET_TZ};

/// Consumes `BatteryCommand` and produces `BatteryReading` values
/// including SoE. A real driver is required to enforce a safe fallback
/// (e.g. zero power) on loss of commands; heartbeat/ramp-rate details are
/// out of scope here.
#[async_trait]
pub trait BatteryDriver: Send + Sync {
    async fn run(
        &self,
        commands: Receiver<BatteryCommand>,
        readings: Sender<BatteryReading>,
        shutdown: tokio::sync::watch::Receiver<bool>,
    );
}

/// A first-order energy-balance model: integrates commanded power (after
/// applying charge efficiency on the charge side) against a capacity,
/// clamped to the configured SoE bounds.
pub struct SimulatedBattery {
    pub device_id: DeviceId,
    pub period: std::time::Duration,
    pub charge_efficiency: f64,
    pub soe_min: Energy,
    pub soe_max: Energy,
    soe: Mutex<Energy>,
    last_target: Mutex<crate::domain::types::Power>,
    next_reading_id: AtomicU64,
}

impl SimulatedBattery {
    pub fn new(
        device_id: DeviceId,
        period: std::time::Duration,
        initial_soe: Energy,
        charge_efficiency: f64,
        soe_min: Energy,
        soe_max: Energy,
    ) -> Self {
        Self {
            device_id,
            period,
            charge_efficiency,
            soe_min,
            soe_max,
            soe: Mutex::new(initial_soe),
            last_target: Mutex::new(crate::domain::types::Power::ZERO),
            next_reading_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl BatteryDriver for SimulatedBattery {
    async fn run(
        &self,
        mut commands: Receiver<BatteryCommand>,
        readings: Sender<BatteryReading>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(cmd) => *self.last_target.lock().unwrap() = cmd.target,
                        None => return,
                    }
                }
                _ = ticker.tick() => {
                    let target = *self.last_target.lock().unwrap();
                    let hours = self.period.as_secs_f64() / 3600.0;
                    let mut soe = self.soe.lock().unwrap();
                    let delta = if target.as_kw() < 0.0 {
                        -target.as_kw() * hours * self.charge_efficiency
                    } else {
                        -target.as_kw() * hours / self.charge_efficiency
                    };
                    let next = (soe.as_kwh() + delta).clamp(self.soe_min.as_kwh(), self.soe_max.as_kwh());
                    *soe = Energy::kwh(next);
                    let soe = *soe;

                    let reading = BatteryReading {
                        meta: ReadingMeta {
                            reading_id: self.next_reading_id.fetch_add(1, Ordering::Relaxed),
                            device_id: self.device_id.clone(),
                            timestamp: InstantT::now_in(MARKET_TZ),
                        },
                        soe,
                        last_target_power: target,
                        available_inverter_blocks: None,
                        command_source: CommandSource::Controller,
                    };
                    if readings.try_send(reading).is_err() {
                        warn!(device = %self.device_id, "battery reading channel full, dropping sample");
                    } else {
                        debug!(device = %self.device_id, soe = %soe, "emitted battery reading");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}
