//! Board wiring and peripheral adapters

use core::convert::Infallible;

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm, PwmOutput};
use embassy_time::Delay;

use cablecar_drivers::buzzer::ToneOutput;
use cablecar_drivers::motor::DriveCalibration;
use cablecar_drivers::Device;

/// Motor PWM period: 125 MHz / 5000 = 25 kHz, above hearing
pub const MOTOR_PWM_TOP: u16 = 4_999;

/// Cart travel at full duty, measured on the test rig
pub const DRIVE_CALIBRATION: DriveCalibration = DriveCalibration { mm_per_s_full: 120 };

/// The device as wired on this board
pub type BoardDevice = Device<
    PwmOutput<'static>,
    Output<'static>,
    Output<'static>,
    PwmTone,
    Output<'static>,
    Delay,
>;

/// Square-wave tone on channel A of a PWM slice
pub struct PwmTone {
    pwm: Pwm<'static>,
    config: PwmConfig,
}

impl PwmTone {
    pub fn new(pwm: Pwm<'static>) -> Self {
        let mut tone = Self {
            pwm,
            config: PwmConfig::default(),
        };
        tone.silence();
        tone
    }

    fn silence(&mut self) {
        self.config.compare_a = 0;
        self.pwm.set_config(&self.config);
    }
}

impl ToneOutput for PwmTone {
    type Error = Infallible;

    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), Infallible> {
        if frequency_hz == 0 {
            self.silence();
            return Ok(());
        }

        // Smallest divider that lets the period fit the 16-bit counter
        let clk = u64::from(clk_sys_freq());
        let hz = u64::from(frequency_hz);
        let divider = (clk / (hz * 65_536) + 1).clamp(1, 255);
        let top = (clk / (divider * hz)).saturating_sub(1).min(u64::from(u16::MAX));

        self.config.divider = (divider as u8).into();
        self.config.top = top as u16;
        self.config.compare_a = self.config.top / 2;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), Infallible> {
        self.silence();
        Ok(())
    }
}
