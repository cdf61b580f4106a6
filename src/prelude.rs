//! Convenience re-export of the types most callers need.

pub use crate::batch::{run_batch, BatchCase};
pub use crate::cycle::{Cycle, CycleRow};
pub use crate::driver::Driver;
pub use crate::error::SimError;
pub use crate::post_process::{
    accel_stats, battery_wear, diagnostics, estimate_corrected_fuel_kj, summarize, AccelStats,
    BatteryWear, Diagnostics, EnergyFlow, RunResult, Summary,
};
pub use crate::step_state::StepState;
pub use crate::vehicle::{PowertrainType, Vehicle, VehicleParams};
