//! Open-loop DC drive motor
//!
//! The drive has no encoder. A distance is turned into a run time from a
//! measured full-speed travel rate, the motor runs for that time and is
//! then braked.
//!
//! Wiring is an L298N-style bridge: PWM on the enable input sets the duty,
//! two logic inputs set the direction. Both inputs low with enable high is
//! an active brake.
//!
//! ```ignore
//! let mut drive = OpenLoopDrive::new(pwm, in_a, in_b, DriveCalibration::default());
//! let ms = drive.calibration().run_time_ms(DistanceUnit::Centimeters, speed, 2)?;
//! drive.start(Direction::Backward, speed)?;
//! delay.delay_ms(ms).await;
//! drive.brake()?;
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use cablecar_core::config::DistanceUnit;
use cablecar_core::traits::{DeviceFault, Direction, Speed};

/// How long the active brake is held before the bridge is released (ms)
pub const BRAKE_MS: u32 = 50;

/// Measured travel rate of the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveCalibration {
    /// Travel at 100% duty (mm/s)
    pub mm_per_s_full: u32,
}

impl Default for DriveCalibration {
    fn default() -> Self {
        Self { mm_per_s_full: 120 }
    }
}

impl DriveCalibration {
    /// Run time for `distance` at `speed`, in milliseconds
    ///
    /// In [`DistanceUnit::Time`] the distance already is the run time.
    /// Travel is assumed proportional to duty. Returns `None` for an
    /// uncalibrated (zero rate) drive.
    pub fn run_time_ms(&self, unit: DistanceUnit, speed: Speed, distance: u32) -> Option<u64> {
        let micrometres = match unit {
            DistanceUnit::Centimeters => u64::from(distance) * 10_000,
            DistanceUnit::Inches => u64::from(distance) * 25_400,
            DistanceUnit::Time => return Some(u64::from(distance)),
        };

        // um/s = mm/s * 1000 * duty / 100
        let rate = u64::from(self.mm_per_s_full) * 10 * u64::from(speed.duty_percent());
        if rate == 0 {
            return None;
        }
        let scaled = micrometres * 1000;
        Some(scaled / rate + u64::from(scaled % rate != 0))
    }
}

/// Open-loop DC motor on an H-bridge
pub struct OpenLoopDrive<P, A, B> {
    pwm: P,
    in_a: A,
    in_b: B,
    calibration: DriveCalibration,
    running: bool,
}

impl<P: SetDutyCycle, A: OutputPin, B: OutputPin> OpenLoopDrive<P, A, B> {
    /// Create a drive; the bridge is not touched until the first command
    pub fn new(pwm: P, in_a: A, in_b: B, calibration: DriveCalibration) -> Self {
        Self {
            pwm,
            in_a,
            in_b,
            calibration,
            running: false,
        }
    }

    /// Get the calibration
    pub fn calibration(&self) -> &DriveCalibration {
        &self.calibration
    }

    /// Check if the motor is powered
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Power the motor in `direction` at `speed`
    pub fn start(&mut self, direction: Direction, speed: Speed) -> Result<(), DeviceFault> {
        // Duty off before the inputs change; a held brake has it fully on
        self.set_duty_percent(0)?;

        let (a, b) = match direction {
            Direction::Forward => (true, false),
            Direction::Backward => (false, true),
        };
        set_level(&mut self.in_a, a)?;
        set_level(&mut self.in_b, b)?;

        self.set_duty_percent(speed.duty_percent())?;
        self.running = true;
        Ok(())
    }

    /// Short the motor terminals
    pub fn brake(&mut self) -> Result<(), DeviceFault> {
        self.running = false;
        set_level(&mut self.in_a, false)?;
        set_level(&mut self.in_b, false)?;
        self.set_duty_percent(100)
    }

    /// Switch the bridge off
    pub fn release(&mut self) -> Result<(), DeviceFault> {
        self.running = false;
        self.set_duty_percent(0)
    }

    fn set_duty_percent(&mut self, percent: u8) -> Result<(), DeviceFault> {
        self.pwm
            .set_duty_cycle_percent(percent)
            .map_err(|_| DeviceFault::Motor)
    }
}

fn set_level<O: OutputPin>(pin: &mut O, high: bool) -> Result<(), DeviceFault> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| DeviceFault::Motor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPwm};

    fn speed(level: u8) -> Speed {
        Speed::new(level).unwrap()
    }

    #[test]
    fn test_run_time_scales_with_speed() {
        let cal = DriveCalibration { mm_per_s_full: 100 };

        // 2 cm at 100%: 20 mm at 100 mm/s
        assert_eq!(
            cal.run_time_ms(DistanceUnit::Centimeters, speed(10), 2),
            Some(200)
        );
        // Half duty, twice as long
        assert_eq!(
            cal.run_time_ms(DistanceUnit::Centimeters, speed(5), 2),
            Some(400)
        );
        // 1 inch at 30%: 25.4 mm at 30 mm/s, rounded up
        assert_eq!(cal.run_time_ms(DistanceUnit::Inches, speed(3), 1), Some(847));
    }

    #[test]
    fn test_time_unit_passes_through() {
        let cal = DriveCalibration::default();
        assert_eq!(cal.run_time_ms(DistanceUnit::Time, speed(1), 1500), Some(1500));
    }

    #[test]
    fn test_uncalibrated_drive() {
        let cal = DriveCalibration { mm_per_s_full: 0 };
        assert_eq!(cal.run_time_ms(DistanceUnit::Centimeters, speed(5), 2), None);
    }

    #[test]
    fn test_start_sets_direction_and_duty() {
        let mut drive = OpenLoopDrive::new(
            MockPwm::default(),
            MockPin::default(),
            MockPin::default(),
            DriveCalibration::default(),
        );

        drive.start(Direction::Forward, speed(7)).unwrap();
        assert!(drive.is_running());
        assert!(drive.in_a.high);
        assert!(!drive.in_b.high);
        assert_eq!(drive.pwm.percent(), 70);

        drive.brake().unwrap();
        assert!(!drive.is_running());
        assert!(!drive.in_a.high && !drive.in_b.high);
        assert_eq!(drive.pwm.percent(), 100);

        drive.start(Direction::Backward, speed(5)).unwrap();
        assert!(!drive.in_a.high);
        assert!(drive.in_b.high);
        assert_eq!(drive.pwm.percent(), 50);

        drive.release().unwrap();
        assert_eq!(drive.pwm.percent(), 0);
    }

    #[test]
    fn test_pin_failure_is_motor_fault() {
        let mut drive = OpenLoopDrive::new(
            MockPwm::default(),
            MockPin::failing(),
            MockPin::default(),
            DriveCalibration::default(),
        );
        assert_eq!(
            drive.start(Direction::Forward, speed(5)),
            Err(DeviceFault::Motor)
        );
        assert!(!drive.is_running());
    }
}
