//! Driver-contract traits for the external collaborators the control
//! core depends on but does not implement: the meter, the battery, the
//! schedule provider and (in `predictor`) the imbalance market feed.
//! Each trait has a `Simulated*` implementation so the binary and tests
//! can run the whole pipeline without real Modbus/HTTP backends.
pub mod battery;
pub mod meter;
pub mod schedule_provider;

pub use battery::{BatteryDriver, SimulatedBattery};
pub use meter::{MeterDriver, SimulatedMeter};
pub use schedule_provider::{ScheduleProvider, SimulatedScheduleProvider};
