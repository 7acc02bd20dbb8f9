//! Drive motor implementations
//!
//! - Open-loop DC: PWM speed, H-bridge direction, timed runs

pub mod open_loop;

pub use open_loop::{DriveCalibration, OpenLoopDrive, BRAKE_MS};
