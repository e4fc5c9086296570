#![allow(dead_code)]
//! The Imbalance Predictor: a small reader-writer-locked cache of the most
//! recently observed imbalance price/volume, plus the synchronous
//! prediction rule strategies query against it.
//!
//! The cache is the only piece of state in the core shared across more
//! than one reactor: a polling task calls `observe_price`/`observe_volume`
//! as fresh data arrives, the controller calls `predict` once per tick.
//! `parking_lot::RwLock` keeps the read path (many ticks) cheap relative
//! to the write path (one poll every few seconds).
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::time::{floor_hh, SETTLEMENT_PERIOD};
use crate::domain::types::{Energy, InstantT, Rate};

#[derive(Debug, Clone, Copy, Default)]
pub struct PredictorCache {
    pub price: Option<(Rate, InstantT)>,
    pub volume: Option<(Energy, InstantT)>,
}

pub struct ImbalancePredictor {
    cache: RwLock<PredictorCache>,
}

impl Default for ImbalancePredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectionalPredictionConfig {
    pub allow_prediction: bool,
    pub volume_cutoff: Energy,
    pub time_cutoff_secs: i64,
}

impl DirectionalPredictionConfig {
    pub fn time_cutoff(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.time_cutoff_secs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NivPredictionConfig {
    pub when_short: DirectionalPredictionConfig,
    pub when_long: DirectionalPredictionConfig,
}

/// A usable (price, volume) pair for the current settlement period, either
/// observed directly or carried forward as a forecast from the previous SP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub price: Rate,
    pub volume: Energy,
}

impl ImbalancePredictor {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(PredictorCache::default()),
        }
    }

    pub fn observe_price(&self, price: Rate, sp_start: InstantT) {
        self.cache.write().price = Some((price, sp_start));
    }

    pub fn observe_volume(&self, volume: Energy, sp_start: InstantT) {
        self.cache.write().volume = Some((volume, sp_start));
    }

    /// Implements the four-step prediction rule exactly.
    pub fn predict(&self, t: InstantT, cfg: &NivPredictionConfig) -> Option<Prediction> {
        let cur_sp = floor_hh(t);
        let prev_sp = cur_sp.sub(SETTLEMENT_PERIOD);
        let time_into = t.duration_since(cur_sp);

        let cache = self.cache.read();
        let (price, price_sp) = (*cache).price?;
        let (volume, volume_sp) = (*cache).volume?;

        if price_sp == cur_sp && volume_sp == cur_sp {
            if time_into < chrono::Duration::minutes(10) {
                return None;
            }
            return Some(Prediction { price, volume });
        }

        if price_sp == prev_sp && volume_sp == prev_sp {
            let directional = if volume.as_kwh() > 0.0 {
                &cfg.when_short
            } else {
                &cfg.when_long
            };
            if !directional.allow_prediction {
                return None;
            }
            if time_into >= directional.time_cutoff() {
                return None;
            }
            if volume.as_kwh().abs() < directional.volume_cutoff.as_kwh() {
                return None;
            }
            return Some(Prediction { price, volume });
        }

        None
    }
}

/// External collaborator contract: polls a vendor imbalance API and feeds
/// the predictor's cache. Out of scope in its real (HTTP) form; the
/// simulated implementation below stands in for tests and the demo binary.
#[async_trait]
pub trait ImbalanceProvider: Send + Sync {
    async fn poll_once(&self, predictor: &ImbalancePredictor, now: InstantT);
}

/// Produces a plausible, deterministic-enough price/volume series so the
/// rest of the system can be exercised without a live market feed.
pub struct SimulatedImbalanceProvider {
    pub base_price: Rate,
    pub base_volume: Energy,
}

impl Default for SimulatedImbalanceProvider {
    fn default() -> Self {
        Self {
            base_price: Rate::pence_per_kwh(8.0),
            base_volume: Energy::kwh(50.0),
        }
    }
}

#[async_trait]
impl ImbalanceProvider for SimulatedImbalanceProvider {
    async fn poll_once(&self, predictor: &ImbalancePredictor, now: InstantT) {
        let sp = floor_hh(now);
        let wobble = (now.hour() as f64 % 4.0) - 2.0;
        predictor.observe_price(
            Rate::pence_per_kwh(self.base_price.as_pence_per_kwh() + wobble * 3.0),
            sp,
        );
        predictor.observe_volume(
            Energy::kwh(self.base_volume.as_kwh() * if now.hour() % 2 == 0 { 1.0 } else { -1.0 }),
            sp,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MARKET_TZ;
    use chrono::TimeZone;

    fn london(h: u32, m: u32) -> InstantT {
        InstantT(MARKET_TZ.with_ymd_and_hms(2023, 9, 12, h, m, 0).unwrap())
    }

    fn cfg() -> NivPredictionConfig {
        NivPredictionConfig {
            when_short: DirectionalPredictionConfig {
                allow_prediction: true,
                volume_cutoff: Energy::kwh(10.0),
                time_cutoff_secs: 20 * 60,
            },
            when_long: DirectionalPredictionConfig {
                allow_prediction: true,
                volume_cutoff: Energy::kwh(10.0),
                time_cutoff_secs: 20 * 60,
            },
        }
    }

    #[test]
    fn current_sp_data_rejected_in_first_ten_minutes() {
        let predictor = ImbalancePredictor::new();
        let sp = london(9, 0);
        predictor.observe_price(Rate::pence_per_kwh(5.0), sp);
        predictor.observe_volume(Energy::kwh(20.0), sp);
        assert!(predictor.predict(london(9, 5), &cfg()).is_none());
        assert!(predictor.predict(london(9, 11), &cfg()).is_some());
    }

    #[test]
    fn previous_sp_used_as_forecast_when_short() {
        let predictor = ImbalancePredictor::new();
        let prev_sp = london(8, 30);
        predictor.observe_price(Rate::pence_per_kwh(5.0), prev_sp);
        predictor.observe_volume(Energy::kwh(20.0), prev_sp);
        let p = predictor.predict(london(9, 5), &cfg()).unwrap();
        assert_eq!(p.volume, Energy::kwh(20.0));
    }

    #[test]
    fn previous_sp_rejected_past_time_cutoff() {
        let predictor = ImbalancePredictor::new();
        let prev_sp = london(8, 30);
        predictor.observe_price(Rate::pence_per_kwh(5.0), prev_sp);
        predictor.observe_volume(Energy::kwh(20.0), prev_sp);
        assert!(predictor.predict(london(9, 25), &cfg()).is_none());
    }

    #[test]
    fn previous_sp_rejected_below_volume_cutoff() {
        let predictor = ImbalancePredictor::new();
        let prev_sp = london(8, 30);
        predictor.observe_price(Rate::pence_per_kwh(5.0), prev_sp);
        predictor.observe_volume(Energy::kwh(2.0), prev_sp);
        assert!(predictor.predict(london(9, 5), &cfg()).is_none());
    }

    #[test]
    fn stale_data_outside_current_and_previous_sp_is_rejected() {
        let predictor = ImbalancePredictor::new();
        let old_sp = london(7, 30);
        predictor.observe_price(Rate::pence_per_kwh(5.0), old_sp);
        predictor.observe_volume(Energy::kwh(20.0), old_sp);
        assert!(predictor.predict(london(9, 5), &cfg()).is_none());
    }
}
