//! Piezo buzzer
//!
//! Notes are played at their equal-temperament frequency. The output is
//! anything that can start and stop a square wave, typically a PWM slice
//! whose period is reprogrammed per note.

use cablecar_core::traits::{DeviceFault, Note};

/// Frequency of the countdown beep (Hz)
pub const BEEP_HZ: u32 = 2_000;

/// Length of the countdown beep (ms)
pub const BEEP_MS: u32 = 100;

/// Square-wave output driving the buzzer
pub trait ToneOutput {
    type Error;

    /// Start a tone at `frequency_hz`, replacing any tone already playing
    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), Self::Error>;

    /// Silence the output
    fn stop_tone(&mut self) -> Result<(), Self::Error>;
}

/// Buzzer on a tone output
pub struct Buzzer<T> {
    output: T,
    sounding: bool,
}

impl<T: ToneOutput> Buzzer<T> {
    pub fn new(output: T) -> Self {
        Self {
            output,
            sounding: false,
        }
    }

    /// Check if a tone is playing
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Start playing a note
    pub fn start_note(&mut self, note: Note) -> Result<(), DeviceFault> {
        self.start(note.frequency_hz())
    }

    /// Start the beep tone
    pub fn start_beep(&mut self) -> Result<(), DeviceFault> {
        self.start(BEEP_HZ)
    }

    /// Silence the buzzer
    pub fn stop(&mut self) -> Result<(), DeviceFault> {
        self.sounding = false;
        self.output.stop_tone().map_err(|_| DeviceFault::Signal)
    }

    fn start(&mut self, frequency_hz: u32) -> Result<(), DeviceFault> {
        self.output
            .start_tone(frequency_hz)
            .map_err(|_| DeviceFault::Signal)?;
        self.sounding = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTone;

    #[test]
    fn test_note_frequency() {
        let mut buzzer = Buzzer::new(MockTone::default());
        buzzer.start_note(Note::A7).unwrap();
        assert!(buzzer.is_sounding());
        buzzer.stop().unwrap();
        assert!(!buzzer.is_sounding());

        buzzer.start_beep().unwrap();
        assert_eq!(buzzer.output.started, [3520, BEEP_HZ]);
    }

    #[test]
    fn test_output_failure_is_signal_fault() {
        let mut buzzer = Buzzer::new(MockTone {
            fail: true,
            ..MockTone::default()
        });
        assert_eq!(buzzer.start_beep(), Err(DeviceFault::Signal));
        assert!(!buzzer.is_sounding());
    }
}
