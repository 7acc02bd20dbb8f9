//! Drive motion primitives
//!
//! Direction and speed as understood by the drive command of the device
//! collaborator.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ConfigurationError;

/// Drive direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Forward drive
    Forward,
    /// Backward (reverse) drive
    Backward,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Drive speed level
///
/// Levels run from 1 (slowest) to 10 (full power). The level is kept
/// abstract here; drivers decide how a level maps onto duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Speed(u8);

impl Speed {
    /// Slowest speed level
    pub const MIN: Speed = Speed(1);
    /// Full speed
    pub const MAX: Speed = Speed(10);

    /// Create a speed level, rejecting values outside 1..=10
    pub const fn new(level: u8) -> Result<Self, ConfigurationError> {
        if level >= Self::MIN.0 && level <= Self::MAX.0 {
            Ok(Self(level))
        } else {
            Err(ConfigurationError::InvalidSpeed)
        }
    }

    /// Get the raw level (1-10)
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Nominal duty cycle for this level, in percent (10-100)
    pub const fn duty_percent(self) -> u8 {
        self.0 * 10
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed(5)
    }
}

impl TryFrom<u8> for Speed {
    type Error = ConfigurationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Speed::new(level)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> u8 {
        speed.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Direction::Forward.opposite(), Direction::Backward);
        assert_eq!(Direction::Backward.opposite(), Direction::Forward);
    }

    #[test]
    fn test_speed_range() {
        assert!(Speed::new(0).is_err());
        assert!(Speed::new(11).is_err());
        assert_eq!(Speed::new(1), Ok(Speed::MIN));
        assert_eq!(Speed::new(10), Ok(Speed::MAX));
        assert_eq!(Speed::new(5).map(|s| s.duty_percent()), Ok(50));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_speed_serde_checks_range() {
        let mut buf = [0u8; 4];
        let bytes = postcard::to_slice(&Speed::MAX, &mut buf).unwrap();
        assert_eq!(bytes, &[10]);
        assert_eq!(postcard::from_bytes::<Speed>(bytes), Ok(Speed::MAX));

        assert!(postcard::from_bytes::<Speed>(&[0]).is_err());
        assert!(postcard::from_bytes::<Speed>(&[11]).is_err());
    }
}
