//! Board-agnostic core logic for the cablecar calibration sampler
//!
//! A calibration run steps an actuator away from its origin, dwelling at
//! each position long enough for a sensor to record it, then returns in a
//! single move and dwells at the origin once more. This crate holds
//! everything that does not depend on the board:
//!
//! - Device control trait and its value types
//! - Run configuration and the `run.toml` parser
//! - Dwell decomposition under a platform wait ceiling
//! - Run state machine and sequencer
//! - Timeline events for aligning sensor logs

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod scheduler;
pub mod state;
pub mod timeline;
pub mod traits;
