use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::domain::readings::{MeterReading, ReadingMeta};
use crate::domain::types::{DeviceId, InstantT, Power, MARKET_TZ};

/// Produces `MeterReading` values on a channel at a configured cadence.
/// Only `power_total_active` is required by the core; other fields are
/// forwarded to sinks untouched.
#[async_trait]
pub trait MeterDriver: Send + Sync {
    async fn run(&self, tx: Sender<MeterReading>, shutdown: tokio::sync::watch::Receiver<bool>);
}

/// Emits a sinusoidal site-power series so the controller has something
/// to react to without a live meter.
pub struct SimulatedMeter {
    pub device_id: DeviceId,
    pub period: std::time::Duration,
    pub base_power_kw: f64,
    pub swing_kw: f64,
    next_reading_id: AtomicU64,
}

impl SimulatedMeter {
    pub fn new(device_id: DeviceId, period: std::time::Duration) -> Self {
        Self {
            device_id,
            period,
            base_power_kw: 10.0,
            swing_kw: 20.0,
            next_reading_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl MeterDriver for SimulatedMeter {
    async fn run(&self, tx: Sender<MeterReading>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = InstantT::now_in(MARKET_TZ);
                    let phase = (now.0.timestamp() as f64 / 900.0).sin();
                    let power = Power::kw(self.base_power_kw + self.swing_kw * phase);
                    let reading = MeterReading::minimal(
                        ReadingMeta {
                            reading_id: self.next_reading_id.fetch_add(1, Ordering::Relaxed),
                            device_id: self.device_id.clone(),
                            timestamp: now,
                        },
                        power,
                    );
                    if tx.try_send(reading).is_err() {
                        warn!(device = %self.device_id, "meter reading channel full, dropping sample");
                    } else {
                        debug!(device = %self.device_id, %power, "emitted meter reading");
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
