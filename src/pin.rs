//! `embedded-hal` digital pin handles for single CH423 lines.

use crate::device::Ch423;
use crate::error::Error;
use crate::gpio::{GpioLevel, GpioPin};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::i2c::I2c;

/// A single line of a [`Ch423`], usable wherever an `embedded-hal` pin is
/// expected.
///
/// Handles borrow the chip, so any number of them can coexist; each call
/// takes the chip lock like the `gpio_*` methods do. Direction is not part
/// of the handle: configure it on the chip first.
#[derive(Debug)]
pub struct Pin<'a, I2C> {
    chip: &'a Ch423<I2C>,
    pin: GpioPin,
}

impl<I2C: I2c> Ch423<I2C> {
    /// Returns a pin handle for `pin`.
    pub fn pin(&self, pin: GpioPin) -> Pin<'_, I2C> {
        Pin { chip: self, pin }
    }
}

impl<I2C> Pin<'_, I2C> {
    /// The line this handle drives.
    pub fn line(&self) -> GpioPin {
        self.pin
    }
}

impl<I2C: I2c> ErrorType for Pin<'_, I2C> {
    type Error = Error;
}

impl<I2C: I2c> InputPin for Pin<'_, I2C> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.chip.gpio_read(self.pin)?.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.chip.gpio_read(self.pin)?.is_high())
    }
}

impl<I2C: I2c> OutputPin for Pin<'_, I2C> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.chip.gpio_write(self.pin, GpioLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.chip.gpio_write(self.pin, GpioLevel::High)
    }
}

impl<I2C: I2c> StatefulOutputPin for Pin<'_, I2C> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.chip.gpio_get_output(self.pin)?.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.chip.gpio_get_output(self.pin)?.is_high())
    }
}
