//! Device control collaborator trait
//!
//! Every side effect of a calibration run goes through this trait: motor
//! drive, timed waits, audible cues and the status LED. All calls complete
//! before they return; the sequencer never issues the next command until
//! the previous one has finished.

use super::motion::{Direction, Speed};
use super::signal::{Note, NoteLength};
use crate::config::DeviceMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time unit for wait calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Convert an amount in this unit to milliseconds
    pub const fn to_millis(self, amount: u32) -> u64 {
        match self {
            TimeUnit::Milliseconds => amount as u64,
            TimeUnit::Seconds => amount as u64 * 1000,
        }
    }
}

/// Failures reported by the device collaborator
///
/// Any fault aborts the run. Nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceFault {
    /// Drive motor failed (stall, driver error)
    Motor,
    /// Buzzer/tone output failed
    Signal,
    /// Status indicator failed
    Indicator,
    /// Timer/delay source failed
    Timer,
    /// Device stopped responding
    Unresponsive,
    /// Device does not support the requested mode
    UnsupportedMode,
}

/// The hardware collaborator driven by the sequencer
///
/// Implementations own the actual motor, buzzer, LED and timer. The
/// sequencer holds exclusive access for the lifetime of a run.
#[allow(async_fn_in_trait)]
pub trait DeviceControl {
    /// One-time device mode setup
    ///
    /// Must be idempotent: calling it twice with the same mode has the same
    /// effect as calling it once.
    fn configure(&mut self, mode: &DeviceMode) -> Result<(), DeviceFault>;

    /// Drive the actuator by `distance` (in the configured distance unit)
    ///
    /// Returns once the motion has completed.
    async fn drive(
        &mut self,
        direction: Direction,
        speed: Speed,
        distance: u32,
    ) -> Result<(), DeviceFault>;

    /// Suspend for exactly `amount` of `unit`
    async fn wait(&mut self, amount: u32, unit: TimeUnit) -> Result<(), DeviceFault>;

    /// Play a note
    async fn tone(&mut self, note: Note, length: NoteLength) -> Result<(), DeviceFault>;

    /// Play the short default beep
    async fn beep(&mut self) -> Result<(), DeviceFault>;

    /// Set the status indicator
    fn set_led(&mut self, on: bool) -> Result<(), DeviceFault>;
}
