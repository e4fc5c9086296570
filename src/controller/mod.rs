#![allow(dead_code)]
//! The single-threaded control reactor: the only place strategy outputs,
//! the prioritiser and the constrainer are brought together each tick.
//! Driver channels are wired in directly rather than through a separate
//! fan-in stage — with only three producers, `tokio::select!` over them
//! here is clearer than routing through an intermediate task.
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constrainer;
use crate::domain::readings::{BatteryCommand, BatteryReading, MeterReading};
use crate::domain::schedule::Schedule;
use crate::domain::types::{Energy, InstantT, Power, MARKET_TZ};
use crate::predictor::ImbalancePredictor;
use crate::prioritiser;
use crate::strategies::{self, Telemetry};

/// A value tagged with the instant it was last updated, used to enforce
/// the per-tick staleness check on meter and battery telemetry.
#[derive(Debug, Clone, Copy)]
pub struct TimedScalar<T> {
    pub value: T,
    pub updated_at: InstantT,
}

impl<T: Copy> TimedScalar<T> {
    pub fn new(value: T, updated_at: InstantT) -> Self {
        Self { value, updated_at }
    }

    pub fn is_stale(&self, now: InstantT, max_age: chrono::Duration) -> bool {
        now.duration_since(self.updated_at) > max_age
    }
}

/// Everything the controller owns exclusively; only the predictor's
/// cache is shared with another reactor.
pub struct ControllerState {
    pub site_power: Option<TimedScalar<Power>>,
    pub battery_soe: Option<TimedScalar<Energy>>,
    pub schedule: Schedule,
    pub last_commanded_power: Power,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            site_power: None,
            battery_soe: None,
            schedule: Schedule::default(),
            last_commanded_power: Power::ZERO,
        }
    }
}

pub struct BatteryController {
    cfg: Config,
    predictor: Arc<ImbalancePredictor>,
    state: ControllerState,
}

impl BatteryController {
    pub fn new(cfg: Config, predictor: Arc<ImbalancePredictor>) -> Self {
        Self {
            cfg,
            predictor,
            state: ControllerState::default(),
        }
    }

    fn on_meter_reading(&mut self, reading: MeterReading) {
        self.state.site_power = Some(TimedScalar::new(
            reading.power_total_active,
            reading.meta.timestamp,
        ));
    }

    fn on_battery_reading(&mut self, reading: BatteryReading) {
        self.state.battery_soe = Some(TimedScalar::new(reading.soe, reading.meta.timestamp));
    }

    fn on_schedule(&mut self, schedule: Schedule) {
        self.state.schedule = schedule;
    }

    /// Runs one tick: staleness check, strategy dispatch, prioritise,
    /// constrain, emit. Returns the diagnostics for logging/telemetry,
    /// or `None` if the tick was skipped for stale telemetry.
    fn tick(&mut self, t: InstantT) -> Option<(Power, prioritiser::PrioritiserDiagnostics)> {
        let max_age = chrono::Duration::seconds(self.cfg.controller.max_reading_age_secs as i64);

        let site_power = self.state.site_power.filter(|s| !s.is_stale(t, max_age));
        let battery_soe = self.state.battery_soe.filter(|s| !s.is_stale(t, max_age));

        let (Some(site_power), Some(battery_soe)) = (site_power, battery_soe) else {
            warn!(%t, "stale telemetry, skipping tick");
            return None;
        };

        let site_power_value = if self.cfg.controller.bess_is_emulated {
            site_power.value - self.state.last_commanded_power
        } else {
            site_power.value
        };

        let tele = Telemetry {
            site_power: site_power_value,
            last_commanded_power: self.state.last_commanded_power,
            soe: battery_soe.value,
            charge_efficiency: self.cfg.battery.charge_efficiency,
        };

        let components = vec![
            strategies::schedule_follower::evaluate(t, &tele, &self.state.schedule),
            strategies::soe_target::evaluate_discharge_to_soe(
                t,
                &self.cfg.strategies.discharge_to_soe,
                &tele,
            ),
            strategies::peak_discharge::evaluate(
                t,
                &self.cfg.strategies.peak_discharge,
                &tele,
                &self.predictor,
            ),
            strategies::niv_chase::evaluate(t, &self.cfg.strategies.niv_chase, &tele, &self.predictor),
            strategies::soe_target::evaluate_charge_to_soe(
                t,
                &self.cfg.strategies.charge_to_soe,
                &tele,
            ),
            strategies::peak_approach::evaluate(
                t,
                &self.cfg.strategies.peak_approach,
                &tele,
                &self.predictor,
            ),
            strategies::avoidance::evaluate_import_avoidance(
                t,
                &self.cfg.strategies.import_avoidance,
                &tele,
            ),
            strategies::avoidance::evaluate_export_avoidance(
                t,
                &self.cfg.strategies.export_avoidance,
                &tele,
            ),
            strategies::avoidance::evaluate_import_avoidance_when_short(
                t,
                &self.cfg.strategies.import_avoidance_when_short,
                &tele,
                &self.predictor,
            ),
        ];

        let (raw, diagnostics) = prioritiser::prioritise(&components);

        let (constrained, _) = constrainer::constrain(
            raw,
            &self.cfg.battery.limits(),
            &self.cfg.site.limits(),
            battery_soe.value,
            self.state.last_commanded_power,
            site_power_value,
        );

        Some((constrained, diagnostics))
    }

    /// The reactor loop: `tokio::select!` over five sources, per the
    /// concurrency model. Runs until the shutdown signal fires.
    pub async fn run(
        mut self,
        mut tick_interval: tokio::time::Interval,
        mut meter_rx: mpsc::Receiver<MeterReading>,
        mut battery_rx: mpsc::Receiver<BatteryReading>,
        mut schedule_rx: mpsc::Receiver<Schedule>,
        commands_tx: mpsc::Sender<BatteryCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        info!("controller loop starting");
        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    let t = InstantT::now_in(MARKET_TZ);
                    if let Some((power, diagnostics)) = self.tick(t) {
                        debug!(?diagnostics.contributed_target, ?diagnostics.dropped_min, ?diagnostics.dropped_max, "tick diagnostics");
                        let command = BatteryCommand::new(power);
                        if commands_tx.try_send(command).is_err() {
                            warn!("command channel full, dropping emission");
                        } else {
                            self.state.last_commanded_power = power;
                        }
                    }
                }
                Some(reading) = meter_rx.recv() => {
                    self.on_meter_reading(reading);
                }
                Some(reading) = battery_rx.recv() => {
                    self.on_battery_reading(reading);
                }
                Some(schedule) = schedule_rx.recv() => {
                    self.on_schedule(schedule);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("controller loop shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}
