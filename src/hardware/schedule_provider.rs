use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::domain::schedule::{Schedule, ScheduleAction, ScheduleItem};
use crate::domain::types::{InstantT, MARKET_TZ};

/// Polled periodically; schedule items carry absolute start/end, an
/// action tag and an allow-deviation flag. Equal-to-previous schedules
/// are still forwarded — deduplication, if any, happens at the receiver.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn run(&self, tx: Sender<Schedule>, shutdown: tokio::sync::watch::Receiver<bool>);
}

/// Publishes a short rolling schedule that alternates a do-nothing and an
/// avoid-import window, enough to exercise the schedule-follower strategy
/// end-to-end without a real optimiser upstream.
pub struct SimulatedScheduleProvider {
    pub period: std::time::Duration,
}

#[async_trait]
impl ScheduleProvider for SimulatedScheduleProvider {
    async fn run(&self, tx: Sender<Schedule>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = InstantT::now_in(MARKET_TZ);
                    let schedule = Schedule::new(
                        now,
                        vec![ScheduleItem {
                            start: now,
                            end: now.add(chrono::Duration::hours(1)),
                            action: ScheduleAction::AvoidImport,
                            allow_deviation: false,
                        }],
                    );
                    if tx.try_send(schedule).is_err() {
                        warn!("schedule channel full, dropping update");
                    } else {
                        debug!("published schedule update");
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
