mod api;
mod config;
mod constrainer;
mod controller;
mod domain;
mod hardware;
mod predictor;
mod prioritiser;
mod strategies;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::info;

use config::Config;
use controller::BatteryController;
use domain::types::{DeviceId, Energy, InstantT, MARKET_TZ};
use hardware::{BatteryDriver, MeterDriver, ScheduleProvider, SimulatedBattery, SimulatedMeter, SimulatedScheduleProvider};
use predictor::{ImbalancePredictor, ImbalanceProvider, SimulatedImbalanceProvider};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init_tracing(&cfg.telemetry);

    let cfg = Arc::new(cfg);
    info!(tick_period_secs = cfg.controller.tick_period_secs, "starting bess-control-core");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tick_period = Duration::from_secs(cfg.controller.tick_period_secs);
    let capacity = cfg.controller.channel_capacity;

    let (meter_tx, meter_rx) = mpsc::channel(capacity);
    let (battery_readings_tx, battery_readings_rx) = mpsc::channel(capacity);
    let (battery_commands_tx, battery_commands_rx) = mpsc::channel(capacity);
    let (schedule_tx, schedule_rx) = mpsc::channel(capacity);

    let meter = SimulatedMeter::new(DeviceId::from("meter-sim-1"), tick_period);
    let battery = SimulatedBattery::new(
        DeviceId::from("battery-sim-1"),
        tick_period,
        Energy::kwh((cfg.battery.soe_min_kwh + cfg.battery.soe_max_kwh) / 2.0),
        cfg.battery.charge_efficiency,
        Energy::kwh(cfg.battery.soe_min_kwh),
        Energy::kwh(cfg.battery.soe_max_kwh),
    );
    let schedule_provider = SimulatedScheduleProvider { period: tick_period * 10 };
    let imbalance_provider = SimulatedImbalanceProvider::default();

    let predictor = Arc::new(ImbalancePredictor::new());

    let meter_shutdown = shutdown_rx.clone();
    tokio::spawn(async move { meter.run(meter_tx, meter_shutdown).await });

    let battery_shutdown = shutdown_rx.clone();
    tokio::spawn(async move { battery.run(battery_commands_rx, battery_readings_tx, battery_shutdown).await });

    let schedule_shutdown = shutdown_rx.clone();
    tokio::spawn(async move { schedule_provider.run(schedule_tx, schedule_shutdown).await });

    let imbalance_predictor = predictor.clone();
    let mut imbalance_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick_period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    imbalance_provider.poll_once(&imbalance_predictor, InstantT::now_in(MARKET_TZ)).await;
                }
                _ = imbalance_shutdown.changed() => {
                    if *imbalance_shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    });

    let controller_cfg = (*cfg).clone();
    let controller = BatteryController::new(controller_cfg, predictor.clone());
    let controller_shutdown = shutdown_rx.clone();
    let tick_interval = tokio::time::interval(tick_period);
    let controller_handle = tokio::spawn(async move {
        controller
            .run(
                tick_interval,
                meter_rx,
                battery_readings_rx,
                schedule_rx,
                battery_commands_tx,
                controller_shutdown,
            )
            .await
    });

    let api_cfg = cfg.clone();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    let app = api::router(api_cfg);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(telemetry::shutdown_signal())
            .await;
    });

    telemetry::shutdown_signal().await;
    info!("shutdown signal received, stopping reactors");
    let _ = shutdown_tx.send(true);

    let _ = controller_handle.await;
    Ok(())
}
