//! Configuration type definitions
//!
//! These types describe one calibration run and the platform it runs on.
//! They are built once at startup (from `run.toml` or the reference values)
//! and never change for the lifetime of the run.

use heapless::String;

use super::error::ConfigurationError;
use crate::scheduler::dwell::{round_ticks, WaitCeiling};
use crate::traits::{Direction, Note, NoteLength, Speed, Tempo};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 24;

/// Device hardware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceVersion {
    V1,
    #[default]
    V2,
}

/// Unit the drive distance is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DistanceUnit {
    #[default]
    Centimeters,
    Inches,
    /// Distance is a drive duration in milliseconds
    Time,
}

/// One-time device mode setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceMode {
    /// Hardware generation
    pub version: DeviceVersion,
    /// Unit for every drive distance in the run
    pub distance_unit: DistanceUnit,
    /// Tempo used for note lengths
    pub tempo: Tempo,
}

/// Settle countdown before the first motion event
///
/// Gives residual motion from pressing start time to die out, so the
/// first step shows up as a clean event on the inertia sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SettleConfig {
    /// Number of beeps in the countdown
    pub cue_count: u8,
    /// Wait after each beep (seconds)
    pub cue_interval_s: f64,
    /// Closing tone
    pub tone: Note,
    /// Closing tone length
    pub tone_length: NoteLength,
    /// Wait after the closing tone (seconds)
    pub final_wait_s: f64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            cue_count: 3,
            cue_interval_s: 10.0,
            tone: Note::A7,
            tone_length: NoteLength::Half,
            final_wait_s: 10.0,
        }
    }
}

impl SettleConfig {
    /// Total settle time spent in waits (seconds)
    pub fn wait_s(&self) -> f64 {
        self.cue_count as f64 * self.cue_interval_s + self.final_wait_s
    }

    /// Check both settle waits against the ceiling
    pub fn validate(&self, ceiling: &WaitCeiling) -> Result<(), ConfigurationError> {
        for wait_s in [self.cue_interval_s, self.final_wait_s] {
            if !wait_s.is_finite() || wait_s < 0.0 {
                return Err(ConfigurationError::InvalidSettleWait);
            }
            if round_ticks(wait_s) > ceiling.max_ticks() {
                return Err(ConfigurationError::SettleWaitAboveCeiling);
            }
        }
        Ok(())
    }
}

/// How a dwell is split into sub-waits
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SubWaitPolicy {
    /// Fewest sub-waits that each fit under the wait ceiling
    #[default]
    FromCeiling,
    /// Fewest sub-waits no longer than the given seconds (must be within the ceiling)
    MaxLength(f64),
    /// Always this many sub-waits, checked against the ceiling
    FixedCount(u32),
}

/// Immutable parameters of one calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunConfig {
    /// Dwell at each sampled position (seconds)
    pub dwell_s: f64,
    /// Drive distance per step (device distance units)
    pub step_distance: u32,
    /// Number of sampled steps
    pub step_count: u32,
    /// Drive speed for steps and rewind
    pub speed: Speed,
    /// Direction of the sampling steps; the rewind uses the opposite
    pub sampling_direction: Direction,
    /// Dwell decomposition policy
    pub sub_wait_policy: SubWaitPolicy,
    /// Device mode applied before the run
    pub device: DeviceMode,
    /// Settle countdown
    pub settle: SettleConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dwell_s: 240.0,
            step_distance: 2,
            step_count: 340,
            speed: Speed::default(),
            sampling_direction: Direction::Backward,
            sub_wait_policy: SubWaitPolicy::default(),
            device: DeviceMode::default(),
            settle: SettleConfig::default(),
        }
    }
}

impl RunConfig {
    /// Distance of the single rewind move back to the origin
    pub fn rewind_distance(&self) -> Result<u32, ConfigurationError> {
        self.step_count
            .checked_mul(self.step_distance)
            .ok_or(ConfigurationError::RewindOverflow)
    }

    /// Direction of the rewind move
    pub fn rewind_direction(&self) -> Direction {
        self.sampling_direction.opposite()
    }

    /// Check the run parameters that do not depend on the dwell plan
    pub fn validate(&self, ceiling: &WaitCeiling) -> Result<(), ConfigurationError> {
        if self.step_count == 0 {
            return Err(ConfigurationError::ZeroStepCount);
        }
        if self.step_distance == 0 {
            return Err(ConfigurationError::ZeroStepDistance);
        }
        if !self.dwell_s.is_finite() || self.dwell_s <= 0.0 {
            return Err(ConfigurationError::InvalidDwell);
        }
        self.rewind_distance()?;
        self.settle.validate(ceiling)
    }
}

/// Top-level sampler configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerConfig {
    /// Name of the calibration environment
    pub label: String<MAX_LABEL_LEN>,
    /// Run parameters
    pub run: RunConfig,
    /// Platform wait ceiling
    pub ceiling: WaitCeiling,
}

impl SamplerConfig {
    /// The cable-cart reference setup: 340 steps of 2 cm, 4 minute dwell,
    /// 20 sub-waits per dwell under a 15 s auto-sleep ceiling
    pub fn reference() -> Self {
        let mut label = String::new();
        let _ = label.push_str("cablecar");
        Self {
            label,
            run: RunConfig {
                sub_wait_policy: SubWaitPolicy::FixedCount(20),
                ..RunConfig::default()
            },
            ceiling: WaitCeiling::REFERENCE,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceiling(max_s: f64) -> WaitCeiling {
        WaitCeiling::new(max_s).unwrap()
    }

    #[test]
    fn test_reference_is_valid() {
        let config = SamplerConfig::reference();
        assert_eq!(config.label.as_str(), "cablecar");
        assert!(config.run.validate(&config.ceiling).is_ok());
        assert_eq!(config.run.rewind_distance(), Ok(680));
        assert_eq!(config.run.rewind_direction(), Direction::Forward);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let run = RunConfig {
            step_count: 0,
            ..RunConfig::default()
        };
        assert_eq!(
            run.validate(&ceiling(15.0)),
            Err(ConfigurationError::ZeroStepCount)
        );
    }

    #[test]
    fn test_zero_distance_rejected() {
        let run = RunConfig {
            step_distance: 0,
            ..RunConfig::default()
        };
        assert_eq!(
            run.validate(&ceiling(15.0)),
            Err(ConfigurationError::ZeroStepDistance)
        );
    }

    #[test]
    fn test_invalid_dwell_rejected() {
        for dwell_s in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let run = RunConfig {
                dwell_s,
                ..RunConfig::default()
            };
            assert_eq!(
                run.validate(&ceiling(15.0)),
                Err(ConfigurationError::InvalidDwell)
            );
        }
    }

    #[test]
    fn test_rewind_overflow() {
        let run = RunConfig {
            step_count: u32::MAX,
            step_distance: 2,
            ..RunConfig::default()
        };
        assert_eq!(
            run.validate(&ceiling(15.0)),
            Err(ConfigurationError::RewindOverflow)
        );
    }

    #[test]
    fn test_settle_wait_above_ceiling() {
        let run = RunConfig::default();
        // Default settle waits are 10 s
        assert_eq!(
            run.validate(&ceiling(5.0)),
            Err(ConfigurationError::SettleWaitAboveCeiling)
        );
    }

    #[test]
    fn test_settle_total() {
        assert_eq!(SettleConfig::default().wait_s(), 40.0);
    }
}
