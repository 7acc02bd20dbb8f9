//! Configuration errors

use core::fmt;

/// Parameters that cannot produce a feasible run on this platform
///
/// Always detected before the first hardware command is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Step count must be at least 1
    ZeroStepCount,
    /// Step distance must be at least 1 unit
    ZeroStepDistance,
    /// Dwell duration must be finite and positive
    InvalidDwell,
    /// Wait ceiling must be finite and at least one scheduler tick
    InvalidCeiling,
    /// Fixed sub-wait count must be at least 1
    ZeroSubWaitCount,
    /// Sub-wait length target must be positive and within the ceiling
    InvalidSubWaitTarget,
    /// Derived sub-wait is longer than the wait ceiling
    SubWaitAboveCeiling,
    /// A settle wait must be finite and non-negative
    InvalidSettleWait,
    /// A settle wait is longer than the wait ceiling
    SettleWaitAboveCeiling,
    /// Speed level outside 1..=10
    InvalidSpeed,
    /// Total rewind distance does not fit the drive command
    RewindOverflow,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ConfigurationError::ZeroStepCount => "step count must be at least 1",
            ConfigurationError::ZeroStepDistance => "step distance must be at least 1",
            ConfigurationError::InvalidDwell => "dwell must be finite, positive and plannable",
            ConfigurationError::InvalidCeiling => "wait ceiling must be finite and at least 1 ms",
            ConfigurationError::ZeroSubWaitCount => "sub-wait count must be at least 1",
            ConfigurationError::InvalidSubWaitTarget => "sub-wait target outside the ceiling",
            ConfigurationError::SubWaitAboveCeiling => "sub-wait exceeds the wait ceiling",
            ConfigurationError::InvalidSettleWait => "settle wait must be finite and non-negative",
            ConfigurationError::SettleWaitAboveCeiling => "settle wait exceeds the wait ceiling",
            ConfigurationError::InvalidSpeed => "speed must be 1-10",
            ConfigurationError::RewindOverflow => "rewind distance overflows",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(ConfigurationError::InvalidSpeed.to_string(), "speed must be 1-10");
        assert_eq!(
            ConfigurationError::SubWaitAboveCeiling.to_string(),
            "sub-wait exceeds the wait ceiling"
        );
    }
}
