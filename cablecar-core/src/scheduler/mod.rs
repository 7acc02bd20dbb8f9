//! Run scheduler
//!
//! Splits dwells into ceiling-respecting sub-waits and sequences the run
//! against the device.

pub mod dwell;
pub mod executor;

pub use dwell::{DwellPlan, SubWaits, WaitCeiling, TICK_HZ};
pub use executor::{run_calibration, RunError, RunSummary, Sequencer};
