//! Pin numbering, pin-level types and the line-oriented CH423 API.

use crate::consts;
use crate::device::Ch423;
use crate::error::{self, Error, Result};
use crate::i2c::Command;
use embedded_hal::i2c::I2c;
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioLevel {
    Low,
    High,
}

impl GpioLevel {
    #[inline]
    pub fn is_high(self) -> bool {
        self == GpioLevel::High
    }

    #[inline]
    fn from_bit(word: u32, mask: u32) -> Self {
        if word & mask != 0 {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

impl From<bool> for GpioLevel {
    fn from(high: bool) -> Self {
        if high {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

/// Output stage of the output-only lines. The chip has one setting (OD_EN)
/// for all 16 of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    PushPull,
    OpenDrain,
}

/// One of the three 8-line groups, each backed by one write command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// IO0-IO7 (lines 0-7), input or output as a group.
    Io,
    /// OC0-OC7 (lines 8-15), output only.
    OcLow,
    /// OC8-OC15 (lines 16-23), output only.
    OcHigh,
}

impl Bank {
    /// All banks, in the order they are written.
    pub const ALL: [Bank; 3] = [Bank::Io, Bank::OcLow, Bank::OcHigh];

    /// The command that writes this bank.
    pub fn command(self) -> Command {
        match self {
            Bank::Io => Command::SetIo,
            Bank::OcLow => Command::SetOcLow,
            Bank::OcHigh => Command::SetOcHigh,
        }
    }

    /// Position of the bank's first line in the 24-bit output word.
    #[inline]
    pub fn shift(self) -> u32 {
        match self {
            Bank::Io => 0,
            Bank::OcLow => 8,
            Bank::OcHigh => 16,
        }
    }

    /// The bank's lines in the 24-bit output word.
    #[inline]
    pub fn mask(self) -> u32 {
        0xFF << self.shift()
    }

    #[inline]
    pub(crate) fn byte(self, word: u32) -> u8 {
        ((word >> self.shift()) & 0xFF) as u8
    }

    #[inline]
    pub(crate) fn flag(self) -> u8 {
        1 << (self.shift() / 8)
    }
}

/// Represents a valid CH423 line number (0-23).
/// Use `GpioPin::new(num)` to create.
///
/// Lines 0-7 are IO0-IO7, lines 8-23 are OC0-OC15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin(pub(crate) u8);

impl GpioPin {
    /// Creates a new GpioPin, returning an error if the number is out of range (0-23).
    pub fn new(pin_num: u8) -> Result<Self> {
        if pin_num < consts::LINE_COUNT {
            Ok(GpioPin(pin_num))
        } else {
            Err(Error::PinArgumentOutOfRange {
                pin: pin_num,
                message: "Line number must be 0-23".to_string(),
            })
        }
    }

    /// Returns the underlying line number (0-23).
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the bank the line belongs to.
    #[inline]
    pub fn bank(&self) -> Bank {
        match self.0 / 8 {
            0 => Bank::Io,
            1 => Bank::OcLow,
            _ => Bank::OcHigh,
        }
    }

    /// Returns the bit index (0-7) within the bank's register.
    #[inline]
    pub fn bit_index(&self) -> u8 {
        self.0 % 8
    }

    /// Returns the bit mask (1 << number) in the 24-bit output word.
    #[inline]
    pub fn mask(&self) -> u32 {
        1u32 << self.0
    }

    /// `true` for IO0-IO7, the only lines that can be inputs.
    #[inline]
    pub fn is_bidirectional(&self) -> bool {
        self.0 < consts::IO_LINE_COUNT
    }
}

fn check_mask(mask: u32) -> Result<()> {
    let extra = mask & !consts::OUTPUT_MASK;
    if extra != 0 {
        return Err(Error::PinArgumentOutOfRange {
            pin: extra.trailing_zeros() as u8,
            message: format!("mask 0x{:08X} covers lines above 23", mask),
        });
    }
    Ok(())
}

impl<I2C: I2c> Ch423<I2C> {
    // --- Single Pin GPIO ---

    /// Gets the direction of a line. Lines 8-23 are always outputs; the
    /// answer for lines 0-7 comes from the cached bank direction.
    pub fn gpio_get_direction(&self, pin: GpioPin) -> Result<GpioDirection> {
        if !pin.is_bidirectional() {
            return Ok(GpioDirection::Output);
        }
        Ok(self.lock()?.shadow.direction)
    }

    /// Makes IO0-IO7 inputs. The bank switches as a whole, so this affects
    /// every line 0-7. Lines 8-23 are rejected with `InvalidArgument`.
    pub fn gpio_set_direction_input(&self, pin: GpioPin) -> Result<()> {
        if !pin.is_bidirectional() {
            return Err(error::output_only_direction(pin.number()));
        }
        let mut inner = self.lock()?;
        debug!("Direction input requested on line {}", pin.number());
        inner.set_io_direction(GpioDirection::Input)
    }

    /// Makes a line an output driving `level`.
    ///
    /// For lines 0-7 the whole IO bank switches to output first, and the
    /// bank's latched values are driven with it. Lines 8-23 are always
    /// outputs and only get their level set.
    pub fn gpio_set_direction_output(&self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        let mut inner = self.lock()?;
        if pin.is_bidirectional() && inner.shadow.direction != GpioDirection::Output {
            debug!("Direction output requested on line {}", pin.number());
            inner.set_io_direction(GpioDirection::Output)?;
        }
        let target = with_level(inner.shadow.outputs, pin.mask(), level);
        inner.write_outputs(target)
    }

    /// Reads the level of a line.
    ///
    /// Every call issues one read transaction, so a bus failure is reported
    /// for any line. The byte only carries lines 0-7; for lines 8-23 the
    /// last written level is returned.
    pub fn gpio_read(&self, pin: GpioPin) -> Result<GpioLevel> {
        let mut inner = self.lock()?;
        let value = inner.read_command(Command::ReadIo)?;
        trace!("Read line {}: IO bank=0x{:02X}", pin.number(), value);
        let word = (value as u32) | (inner.shadow.outputs & !Bank::Io.mask());
        Ok(GpioLevel::from_bit(word, pin.mask()))
    }

    /// Returns the level last requested for a line (the output shadow). For
    /// IO lines in input mode this is the value that will be driven once the
    /// bank becomes an output.
    pub fn gpio_get_output(&self, pin: GpioPin) -> Result<GpioLevel> {
        Ok(GpioLevel::from_bit(self.lock()?.shadow.outputs, pin.mask()))
    }

    /// Sets the output level of a single line.
    pub fn gpio_write(&self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        let mut inner = self.lock()?;
        let target = with_level(inner.shadow.outputs, pin.mask(), level);
        inner.write_outputs(target)
    }

    /// Sets the drive mode of the output-only lines.
    ///
    /// The setting is shared by all of lines 8-23, so changing it for one
    /// changes it for every OC line. Lines 0-7 have no configurable drive
    /// mode and return `UnsupportedFeature`.
    pub fn gpio_set_drive_mode(&self, pin: GpioPin, mode: DriveMode) -> Result<()> {
        if pin.is_bidirectional() {
            return Err(error::unsupported_io_drive_mode(pin.number()));
        }
        let mut inner = self.lock()?;
        let config = inner.shadow.config.with_drive_mode(mode);
        debug!("Drive mode {:?} requested on line {}", mode, pin.number());
        inner.set_config(config)
    }

    /// Gets the drive mode shared by lines 8-23.
    pub fn gpio_get_drive_mode(&self) -> Result<DriveMode> {
        Ok(self.lock()?.shadow.config.drive_mode())
    }

    // --- Bulk GPIO Operations ---

    /// Writes output levels for all lines in `mask` at once (bit n = line n).
    /// Each of the three banks is written at most once, and only if one of
    /// its lines changes.
    pub fn gpio_write_masked(&self, mask: u32, levels: u32) -> Result<()> {
        check_mask(mask)?;
        if mask == 0 {
            return Ok(());
        }
        let mut inner = self.lock()?;
        let target = (inner.shadow.outputs & !mask) | (levels & mask);
        trace!(
            "Writing outputs: mask=0x{:06X}, levels=0x{:06X}, target=0x{:06X}",
            mask,
            levels,
            target
        );
        inner.write_outputs(target)
    }

    /// Reads the levels of all lines in `mask` with one read transaction.
    /// Lines 0-7 come from the chip, lines 8-23 from the output shadow.
    pub fn gpio_read_masked(&self, mask: u32) -> Result<u32> {
        check_mask(mask)?;
        let mut inner = self.lock()?;
        let io = inner.read_command(Command::ReadIo)? as u32;
        let value = (io | (inner.shadow.outputs & !Bank::Io.mask())) & mask;
        trace!("Read outputs: mask=0x{:06X}, value=0x{:06X}", mask, value);
        Ok(value)
    }
}

#[inline]
fn with_level(word: u32, mask: u32, level: GpioLevel) -> u32 {
    match level {
        GpioLevel::High => word | mask,
        GpioLevel::Low => word & !mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::tests::{attached, take_writes};

    fn pin(n: u8) -> GpioPin {
        GpioPin::new(n).unwrap()
    }

    #[test]
    fn test_gpio_pin_creation() {
        assert!(GpioPin::new(0).is_ok());
        assert!(GpioPin::new(23).is_ok());
        assert!(matches!(
            GpioPin::new(24),
            Err(Error::PinArgumentOutOfRange { pin: 24, .. })
        ));
    }

    #[test]
    fn test_gpio_pin_helpers() {
        let io3 = pin(3);
        assert_eq!(io3.bank(), Bank::Io);
        assert_eq!(io3.bit_index(), 3);
        assert!(io3.is_bidirectional());

        let oc0 = pin(8);
        assert_eq!(oc0.bank(), Bank::OcLow);
        assert_eq!(oc0.bit_index(), 0);
        assert_eq!(oc0.mask(), 0x00_0100);
        assert!(!oc0.is_bidirectional());

        let oc15 = pin(23);
        assert_eq!(oc15.bank(), Bank::OcHigh);
        assert_eq!(oc15.bit_index(), 7);
        assert_eq!(oc15.mask(), 0x80_0000);
    }

    #[test]
    fn test_bank_layout() {
        assert_eq!(Bank::Io.mask(), 0x00_00FF);
        assert_eq!(Bank::OcLow.mask(), 0x00_FF00);
        assert_eq!(Bank::OcHigh.mask(), 0xFF_0000);
        assert_eq!(Bank::OcHigh.byte(0xAB_CD_EF), 0xAB);
        assert_eq!(Bank::OcLow.byte(0xAB_CD_EF), 0xCD);
        assert_eq!(Bank::Io.command().address(), 0x30);
        let flags: Vec<u8> = Bank::ALL.iter().map(|b| b.flag()).collect();
        assert_eq!(flags, vec![1, 2, 4]);
    }

    #[test]
    fn test_mask_outside_24_lines_rejected() {
        let chip = attached();
        let err = chip.gpio_write_masked(0x0100_0000, 0).unwrap_err();
        assert!(matches!(err, Error::PinArgumentOutOfRange { pin: 24, .. }));
        assert!(take_writes(&chip).is_empty());
    }

    #[test]
    fn test_empty_mask_is_a_no_op() {
        let chip = attached();
        chip.gpio_write_masked(0, 0xFF_FFFF).unwrap();
        assert!(take_writes(&chip).is_empty());
    }

    #[test]
    fn test_output_lines_read_from_shadow() {
        let chip = attached();
        chip.gpio_write(pin(17), GpioLevel::High).unwrap();
        // The IO byte says nothing about lines 8-23.
        chip.lock().unwrap().i2c.reads.extend([0xFF, 0xFF, 0xFF]);
        assert_eq!(chip.gpio_read(pin(17)).unwrap(), GpioLevel::High);
        assert_eq!(chip.gpio_read(pin(16)).unwrap(), GpioLevel::Low);
        assert_eq!(chip.gpio_read_masked(0xFF_FF00).unwrap(), 0x02_0000);
        assert!(chip.lock().unwrap().i2c.reads.is_empty(), "every read hits the bus");
    }

    #[test]
    fn test_drive_mode_shared_by_all_oc_lines() {
        let chip = attached();
        chip.gpio_set_drive_mode(pin(8), DriveMode::OpenDrain).unwrap();
        chip.gpio_set_drive_mode(pin(23), DriveMode::OpenDrain).unwrap();
        assert_eq!(take_writes(&chip), vec![(0x24, 0x10)]);
        assert_eq!(chip.gpio_get_drive_mode().unwrap(), DriveMode::OpenDrain);
    }

    #[test]
    fn test_level_conversions() {
        assert_eq!(GpioLevel::from(true), GpioLevel::High);
        assert_eq!(GpioLevel::from(false), GpioLevel::Low);
        assert_eq!(with_level(0b1010, 0b0001, GpioLevel::High), 0b1011);
        assert_eq!(with_level(0b1010, 0b0010, GpioLevel::Low), 0b1000);
    }
}
