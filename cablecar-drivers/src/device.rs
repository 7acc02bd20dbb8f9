//! Device collaborator
//!
//! Composes the drive, buzzer and status LED with an async delay source
//! into the [`DeviceControl`] the sequencer runs against. Every call
//! returns only once its hardware action is over.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use cablecar_core::config::{DeviceMode, DeviceVersion, DistanceUnit};
use cablecar_core::traits::{
    DeviceControl, DeviceFault, Direction, Note, NoteLength, Speed, TimeUnit,
};

use crate::buzzer::{Buzzer, ToneOutput, BEEP_MS};
use crate::led::StatusLed;
use crate::motor::{OpenLoopDrive, BRAKE_MS};

/// Board-level device: drive motor, buzzer, status LED and timer
pub struct Device<P, A, B, T, L, D> {
    drive: OpenLoopDrive<P, A, B>,
    buzzer: Buzzer<T>,
    led: StatusLed<L>,
    delay: D,
    mode: DeviceMode,
}

impl<P, A, B, T, L, D> Device<P, A, B, T, L, D>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    T: ToneOutput,
    L: OutputPin,
    D: DelayNs,
{
    pub fn new(
        drive: OpenLoopDrive<P, A, B>,
        buzzer: Buzzer<T>,
        led: StatusLed<L>,
        delay: D,
    ) -> Self {
        Self {
            drive,
            buzzer,
            led,
            delay,
            mode: DeviceMode::default(),
        }
    }

    /// Get the active device mode
    pub fn mode(&self) -> &DeviceMode {
        &self.mode
    }

    /// Sleep for a millisecond count that may exceed one delay call
    async fn sleep_ms(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let chunk = remaining.min(u64::from(u32::MAX)) as u32;
            self.delay.delay_ms(chunk).await;
            remaining -= u64::from(chunk);
        }
    }

    async fn run_drive(
        &mut self,
        direction: Direction,
        speed: Speed,
        run_ms: u64,
    ) -> Result<(), DeviceFault> {
        self.drive.start(direction, speed)?;
        self.sleep_ms(run_ms).await;
        self.drive.brake()?;
        self.delay.delay_ms(BRAKE_MS).await;
        self.drive.release()
    }

    async fn sound(&mut self, note: Option<Note>, ms: u32) -> Result<(), DeviceFault> {
        match note {
            Some(note) => self.buzzer.start_note(note)?,
            None => self.buzzer.start_beep()?,
        }
        self.delay.delay_ms(ms).await;
        self.buzzer.stop()
    }
}

impl<P, A, B, T, L, D> DeviceControl for Device<P, A, B, T, L, D>
where
    P: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    T: ToneOutput,
    L: OutputPin,
    D: DelayNs,
{
    fn configure(&mut self, mode: &DeviceMode) -> Result<(), DeviceFault> {
        // First generation boards only drive by time
        if mode.version == DeviceVersion::V1 && mode.distance_unit != DistanceUnit::Time {
            return Err(DeviceFault::UnsupportedMode);
        }
        self.mode = *mode;
        Ok(())
    }

    async fn drive(
        &mut self,
        direction: Direction,
        speed: Speed,
        distance: u32,
    ) -> Result<(), DeviceFault> {
        let run_ms = self
            .drive
            .calibration()
            .run_time_ms(self.mode.distance_unit, speed, distance)
            .ok_or(DeviceFault::Motor)?;

        let result = self.run_drive(direction, speed, run_ms).await;
        if result.is_err() {
            let _ = self.drive.brake();
        }
        result
    }

    async fn wait(&mut self, amount: u32, unit: TimeUnit) -> Result<(), DeviceFault> {
        self.sleep_ms(unit.to_millis(amount)).await;
        Ok(())
    }

    async fn tone(&mut self, note: Note, length: NoteLength) -> Result<(), DeviceFault> {
        let ms = length.millis(self.mode.tempo);
        let result = self.sound(Some(note), ms).await;
        if result.is_err() {
            let _ = self.buzzer.stop();
        }
        result
    }

    async fn beep(&mut self) -> Result<(), DeviceFault> {
        let result = self.sound(None, BEEP_MS).await;
        if result.is_err() {
            let _ = self.buzzer.stop();
        }
        result
    }

    fn set_led(&mut self, on: bool) -> Result<(), DeviceFault> {
        self.led.set(on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockPin, MockPwm, MockTone};
    use crate::motor::DriveCalibration;
    use cablecar_core::config::SamplerConfig;
    use cablecar_core::scheduler::{run_calibration, RunError};
    use cablecar_core::state::Phase;
    use cablecar_core::timeline::NoopObserver;
    use cablecar_core::traits::Tempo;
    use embassy_futures::block_on;

    type MockDevice = Device<MockPwm, MockPin, MockPin, MockTone, MockPin, MockDelay>;

    fn device_with(led: MockPin) -> MockDevice {
        Device::new(
            OpenLoopDrive::new(
                MockPwm::default(),
                MockPin::default(),
                MockPin::default(),
                DriveCalibration { mm_per_s_full: 100 },
            ),
            Buzzer::new(MockTone::default()),
            StatusLed::new(led, false),
            MockDelay::default(),
        )
    }

    fn device() -> MockDevice {
        device_with(MockPin::default())
    }

    #[test]
    fn test_drive_runs_then_brakes() {
        let mut device = device();
        device.configure(&DeviceMode::default()).unwrap();
        block_on(device.drive(Direction::Backward, Speed::new(5).unwrap(), 2)).unwrap();

        // 20 mm at 50 mm/s, then the brake hold
        assert_eq!(device.delay.delays_ms, [400, BRAKE_MS]);
        assert!(!device.drive.is_running());
    }

    #[test]
    fn test_wait_in_seconds() {
        let mut device = device();
        block_on(device.wait(12, TimeUnit::Seconds)).unwrap();
        block_on(device.wait(250, TimeUnit::Milliseconds)).unwrap();
        assert_eq!(device.delay.delays_ms, [12_000, 250]);
    }

    #[test]
    fn test_tone_follows_tempo() {
        let mut device = device();
        let mode = DeviceMode {
            tempo: Tempo::Fast,
            ..DeviceMode::default()
        };
        device.configure(&mode).unwrap();
        block_on(device.tone(Note::A7, NoteLength::Half)).unwrap();
        block_on(device.beep()).unwrap();

        assert_eq!(
            device.delay.delays_ms,
            [NoteLength::Half.millis(Tempo::Fast), BEEP_MS]
        );
        assert!(!device.buzzer.is_sounding());
    }

    #[test]
    fn test_v1_needs_time_units() {
        let mut device = device();
        let mode = DeviceMode {
            version: DeviceVersion::V1,
            ..DeviceMode::default()
        };
        assert_eq!(device.configure(&mode), Err(DeviceFault::UnsupportedMode));

        let mode = DeviceMode {
            version: DeviceVersion::V1,
            distance_unit: DistanceUnit::Time,
            ..DeviceMode::default()
        };
        assert_eq!(device.configure(&mode), Ok(()));
        assert_eq!(device.configure(&mode), Ok(()));
        assert_eq!(device.mode(), &mode);
    }

    #[test]
    fn test_reference_run_on_device() {
        let mut device = device();
        let config = SamplerConfig::reference();
        let summary = block_on(run_calibration(&mut device, &config, &mut NoopObserver)).unwrap();

        assert_eq!(summary.steps_sampled, 340);
        let drive_ms = 341 * u64::from(BRAKE_MS) + 340 * 400 + 680 * 200;
        let signal_ms = 3 * u64::from(BEEP_MS) + u64::from(NoteLength::Half.millis(Tempo::Medium));
        assert_eq!(
            device.delay.total_ms(),
            summary.waited_ticks + drive_ms + signal_ms
        );
        assert!(!device.led.is_on());
    }

    #[test]
    fn test_led_fault_aborts_run() {
        let mut device = device_with(MockPin::failing());
        let config = SamplerConfig::reference();
        let result = block_on(run_calibration(&mut device, &config, &mut NoopObserver));
        assert_eq!(
            result,
            Err(RunError::Device {
                phase: Phase::Settling,
                step: 0,
                fault: DeviceFault::Indicator,
            })
        );
        // Stopped before the first step
        assert!(!device.drive.is_running());
        assert_eq!(device.delay.total_ms(), 40_000 + 3 * u64::from(BEEP_MS) + 1_000);
    }
}
