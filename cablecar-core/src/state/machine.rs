//! Run state machine
//!
//! A run moves through its phases exactly once, in order. Transitions are
//! driven by completion events from the sequencer; any event that does not
//! belong to the current phase leaves the state untouched.

use super::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Run phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Countdown cues while residual motion dies out
    Settling,
    /// Stepping away from the origin, dwelling after each step
    Sampling,
    /// Single move back to the origin
    Rewinding,
    /// Final dwell at the origin
    ZeroDwell,
    /// Run complete
    Done,
}

impl Phase {
    /// All phases in visiting order
    pub const ALL: [Phase; 5] = [
        Phase::Settling,
        Phase::Sampling,
        Phase::Rewinding,
        Phase::ZeroDwell,
        Phase::Done,
    ];

    /// Check if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done)
    }

    /// Check if the actuator moves in this phase
    pub fn drives(&self) -> bool {
        matches!(self, Phase::Sampling | Phase::Rewinding)
    }
}

/// Transient progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunState {
    phase: Phase,
    current_step: u32,
    step_count: u32,
}

impl RunState {
    /// Start a run of `step_count` steps
    pub fn new(step_count: u32) -> Self {
        Self {
            phase: Phase::Settling,
            current_step: 0,
            step_count,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Steps sampled so far (0..=step_count)
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Steps left to sample
    pub fn remaining_steps(&self) -> u32 {
        self.step_count - self.current_step
    }

    /// Apply an event and return the resulting state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Phase::*;

        match (self.phase, event) {
            (Settling, SettleComplete) => Self {
                phase: Sampling,
                ..self
            },

            (Sampling, StepSampled) if self.current_step < self.step_count => {
                let current_step = self.current_step + 1;
                Self {
                    phase: if current_step == self.step_count {
                        Rewinding
                    } else {
                        Sampling
                    },
                    current_step,
                    ..self
                }
            }

            (Rewinding, RewindComplete) => Self {
                phase: ZeroDwell,
                ..self
            },

            (ZeroDwell, ZeroDwellComplete) => Self {
                phase: Done,
                ..self
            },

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run() {
        let mut state = RunState::new(3);
        assert_eq!(state.phase(), Phase::Settling);

        state = state.transition(Event::SettleComplete);
        assert_eq!(state.phase(), Phase::Sampling);

        state = state.transition(Event::StepSampled);
        state = state.transition(Event::StepSampled);
        assert_eq!(state.phase(), Phase::Sampling);
        assert_eq!(state.current_step(), 2);
        assert_eq!(state.remaining_steps(), 1);

        state = state.transition(Event::StepSampled);
        assert_eq!(state.phase(), Phase::Rewinding);
        assert_eq!(state.current_step(), 3);

        state = state.transition(Event::RewindComplete);
        assert_eq!(state.phase(), Phase::ZeroDwell);

        state = state.transition(Event::ZeroDwellComplete);
        assert_eq!(state.phase(), Phase::Done);
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn test_out_of_phase_events_ignored() {
        let state = RunState::new(2);

        assert_eq!(state.transition(Event::StepSampled), state);
        assert_eq!(state.transition(Event::RewindComplete), state);
        assert_eq!(state.transition(Event::ZeroDwellComplete), state);

        let sampling = state.transition(Event::SettleComplete);
        assert_eq!(sampling.transition(Event::SettleComplete), sampling);
        assert_eq!(sampling.transition(Event::ZeroDwellComplete), sampling);
    }

    #[test]
    fn test_done_is_final() {
        let mut state = RunState::new(1);
        for event in [
            Event::SettleComplete,
            Event::StepSampled,
            Event::RewindComplete,
            Event::ZeroDwellComplete,
        ] {
            state = state.transition(event);
        }
        assert_eq!(state.phase(), Phase::Done);

        for event in [
            Event::SettleComplete,
            Event::StepSampled,
            Event::RewindComplete,
            Event::ZeroDwellComplete,
        ] {
            assert_eq!(state.transition(event), state);
        }
    }

    #[test]
    fn test_phases_are_ordered() {
        for pair in Phase::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(Phase::Sampling.drives());
        assert!(Phase::Rewinding.drives());
        assert!(!Phase::ZeroDwell.drives());
    }
}
