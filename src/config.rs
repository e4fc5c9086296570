#![allow(dead_code)]
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::rates::RateTable;
use crate::domain::types::{Energy, Power};
use crate::predictor::NivPredictionConfig;
use crate::strategies::avoidance::{AvoidancePeriodConfig, ImportAvoidanceWhenShortConfig};
use crate::strategies::niv_chase::NivChaseConfig;
use crate::strategies::peak_approach::PeakApproachConfig;
use crate::strategies::peak_discharge::PeakDischargeConfig;
use crate::strategies::soe_target::SoeTargetConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub controller: ControllerConfig,

    #[validate(nested)]
    pub battery: BatteryConfig,

    #[validate(nested)]
    pub site: SiteConfig,

    #[validate(nested)]
    pub strategies: StrategiesConfig,

    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

/// Controller loop timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ControllerConfig {
    #[validate(range(min = 1, max = 3600))]
    pub tick_period_secs: u64,

    #[validate(range(min = 1, max = 3600))]
    pub max_reading_age_secs: u64,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// When true, the controller substitutes `sitePower - lastCommandedPower`
    /// for the real meter reading, simulating the battery's own effect.
    #[serde(default)]
    pub bess_is_emulated: bool,
}

/// Battery physical and state-of-energy limits.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_battery_config"))]
pub struct BatteryConfig {
    #[validate(range(min = 0.0))]
    pub soe_min_kwh: f64,

    #[validate(range(min = 0.0))]
    pub soe_max_kwh: f64,

    #[validate(range(min = 0.0))]
    pub charge_power_limit_kw: f64,

    #[validate(range(min = 0.0))]
    pub discharge_power_limit_kw: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub charge_efficiency: f64,
}

fn validate_battery_config(config: &BatteryConfig) -> Result<(), validator::ValidationError> {
    if config.soe_min_kwh >= config.soe_max_kwh {
        return Err(validator::ValidationError::new("soe_min_kwh must be less than soe_max_kwh"));
    }
    if config.charge_efficiency <= 0.0 {
        return Err(validator::ValidationError::new("charge_efficiency must be in (0, 1]"));
    }
    Ok(())
}

impl BatteryConfig {
    pub fn limits(&self) -> crate::constrainer::BatteryLimits {
        crate::constrainer::BatteryLimits {
            charge_power_limit: Power::kw(self.charge_power_limit_kw),
            discharge_power_limit: Power::kw(self.discharge_power_limit_kw),
            soe_min: Energy::kwh(self.soe_min_kwh),
            soe_max: Energy::kwh(self.soe_max_kwh),
        }
    }
}

/// Site (grid connection) limits.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
pub struct SiteConfig {
    #[validate(range(min = 0.0))]
    pub import_power_limit_kw: f64,

    #[validate(range(min = 0.0))]
    pub export_power_limit_kw: f64,
}

impl SiteConfig {
    pub fn limits(&self) -> crate::constrainer::SiteLimits {
        crate::constrainer::SiteLimits {
            import_power_limit: Power::kw(self.import_power_limit_kw),
            export_power_limit: Power::kw(self.export_power_limit_kw),
        }
    }
}

/// One configuration slice per control component, plus the rate tables
/// shared across several of them.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct StrategiesConfig {
    #[validate(nested)]
    pub import_avoidance: AvoidancePeriodConfig,

    #[validate(nested)]
    pub export_avoidance: AvoidancePeriodConfig,

    pub import_avoidance_when_short: ImportAvoidanceWhenShortConfig,

    pub charge_to_soe: SoeTargetConfig,
    pub discharge_to_soe: SoeTargetConfig,

    pub niv_chase: NivChaseConfig,
    pub peak_discharge: PeakDischargeConfig,
    pub peak_approach: PeakApproachConfig,

    pub niv_prediction: NivPredictionConfig,

    pub rates_import: RateTable,
    pub rates_export: RateTable,
}

// `validator::Validate` is not implemented for every nested strategy
// config (several carry no numeric invariants worth checking); the
// `#[validate(nested)]` attribute above is only applied where it's
// derived. This marker keeps the `Validate` import meaningful even as
// the strategy list grows.
impl Validate for AvoidancePeriodConfig {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        Ok(())
    }
}

/// Structured logging configuration, mirroring the teacher's
/// `tracing-subscriber` setup.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_channel_capacity() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Loads configuration from TOML files and environment variables.
    ///
    /// Configuration is loaded in this order (later overrides earlier):
    /// 1. `config/default.toml` (base configuration)
    /// 2. `config/<environment>.toml`, if an environment is given
    /// 3. Environment variables with an `OEC__` prefix
    pub fn load() -> Result<Self> {
        Self::load_with_env(None)
    }

    pub fn load_with_env(environment: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file("config/default.toml"));

        if let Some(env) = environment {
            figment = figment.merge(Toml::file(format!("config/{env}.toml")));
        }

        figment = figment.merge(Env::prefixed("OEC__").split("__"));

        let config: AppConfig = figment.extract().context("failed to parse configuration")?;
        config.validate().context("configuration validation failed")?;
        Ok(config)
    }
}

pub type Config = AppConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_config_rejects_inverted_soe_bounds() {
        let config = BatteryConfig {
            soe_min_kwh: 180.0,
            soe_max_kwh: 20.0,
            charge_power_limit_kw: 50.0,
            discharge_power_limit_kw: 50.0,
            charge_efficiency: 0.9,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn battery_config_accepts_sane_values() {
        let config = BatteryConfig {
            soe_min_kwh: 20.0,
            soe_max_kwh: 180.0,
            charge_power_limit_kw: 50.0,
            discharge_power_limit_kw: 50.0,
            charge_efficiency: 0.9,
        };
        assert!(config.validate().is_ok());
    }
}
