//! Structured logging setup and the shared graceful-shutdown signal.
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetryConfig;

/// Initialises the global `tracing` subscriber from the telemetry
/// configuration, falling back to `RUST_LOG`/`info` if neither is set.
pub fn init_tracing(cfg: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.clone()));

    let subscriber = fmt().with_env_filter(filter).with_target(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Resolves once SIGINT or (on unix) SIGTERM is received, for
/// `axum::serve(...).with_graceful_shutdown(...)` and the controller's
/// `tokio::sync::watch` shutdown channel.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
