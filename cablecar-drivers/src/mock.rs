//! Host-side doubles for embedded-hal peripherals

use std::vec::Vec;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal_async::delay::DelayNs;

use crate::buzzer::ToneOutput;

#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    pub fail: bool,
}

impl MockPin {
    pub fn failing() -> Self {
        Self {
            high: false,
            fail: true,
        }
    }

    fn set(&mut self, high: bool) -> Result<(), digital::ErrorKind> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.high = high;
        Ok(())
    }
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}

#[derive(Debug, Default)]
pub struct MockPwm {
    pub duty: u16,
}

impl MockPwm {
    pub const MAX: u16 = 1000;

    pub fn percent(&self) -> u16 {
        (u32::from(self.duty) * 100 / u32::from(Self::MAX)) as u16
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = pwm::ErrorKind;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockTone {
    /// Every tone started, in Hz
    pub started: Vec<u32>,
    pub sounding: bool,
    pub fail: bool,
}

impl ToneOutput for MockTone {
    type Error = ();

    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.started.push(frequency_hz);
        self.sounding = true;
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), ()> {
        self.sounding = false;
        Ok(())
    }
}

/// Records delays instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    pub delays_ms: Vec<u32>,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.delays_ms.iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

mod tests {
    use super::*;

    #[test]
    fn test_pwm_percent_full_scale() {
        let mut pwm = MockPwm::default();
        pwm.set_duty_cycle_fully_on().unwrap();
        assert_eq!(pwm.duty, MockPwm::MAX);
        assert_eq!(pwm.percent(), 100);
        pwm.set_duty_cycle_percent(70).unwrap();
        assert_eq!(pwm.percent(), 70);
    }
}
