//! Status LED
//!
//! Lit from the end of the settle countdown until the run completes.

use embedded_hal::digital::OutputPin;

use cablecar_core::traits::DeviceFault;

/// LED on a GPIO pin, active-high or active-low
pub struct StatusLed<P> {
    pin: P,
    /// If true, LED on = pin low
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap a pin; the caller sets its initial level
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), DeviceFault> {
        let result = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| DeviceFault::Indicator)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
