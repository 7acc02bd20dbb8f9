//! Events that trigger run state transitions

/// Completion events emitted by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Countdown finished and the status LED is on
    SettleComplete,
    /// One step driven and its dwell finished
    StepSampled,
    /// Actuator is back at the origin
    RewindComplete,
    /// Dwell at the origin finished
    ZeroDwellComplete,
}
