//! The CH423 configuration register.

use crate::consts::cfg;
use crate::gpio::{DriveMode, GpioDirection};
use std::fmt;

/// Value of the one-byte configuration register (command 0x24).
///
/// The register is write-only and whole-byte: changing one bit means writing
/// the complete byte again. This type keeps the full byte so bits the driver
/// does not manage (decoders, interrupt, intensity, sleep) survive every
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config(u8);

impl Config {
    /// Power-up configuration: IO lines input, push-pull, no decoder, awake.
    pub const RESET: Config = Config(cfg::RESET_VALUE);
    pub(crate) const UNKNOWN: Config = Config(cfg::UNKNOWN);

    /// Wraps a raw register value.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Config(bits)
    }

    /// Returns the raw register value.
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    fn is_set(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    #[inline]
    fn with(self, bit: u8, enable: bool) -> Self {
        if enable {
            Config(self.0 | bit)
        } else {
            Config(self.0 & !bit)
        }
    }

    /// Direction of the bidirectional bank (IO_OE).
    pub fn io_direction(self) -> GpioDirection {
        if self.is_set(cfg::IO_OE) {
            GpioDirection::Output
        } else {
            GpioDirection::Input
        }
    }

    /// Returns a copy with IO_OE matching `direction`.
    pub fn with_io_direction(self, direction: GpioDirection) -> Self {
        self.with(cfg::IO_OE, direction == GpioDirection::Output)
    }

    /// Drive mode shared by both output-only banks (OD_EN).
    pub fn drive_mode(self) -> DriveMode {
        if self.is_set(cfg::OD_EN) {
            DriveMode::OpenDrain
        } else {
            DriveMode::PushPull
        }
    }

    /// Returns a copy with OD_EN matching `mode`.
    pub fn with_drive_mode(self, mode: DriveMode) -> Self {
        self.with(cfg::OD_EN, mode == DriveMode::OpenDrain)
    }

    /// DEC_L: LED decoding of the low output bank.
    pub fn decoder_low_enabled(self) -> bool {
        self.is_set(cfg::DEC_L)
    }

    /// DEC_H: LED decoding of the high output bank.
    pub fn decoder_high_enabled(self) -> bool {
        self.is_set(cfg::DEC_H)
    }

    /// X_INT: input-change interrupt output.
    pub fn external_interrupt_enabled(self) -> bool {
        self.is_set(cfg::X_INT)
    }

    /// LED intensity field (0-3). Only meaningful in LED mode.
    pub fn intensity(self) -> u8 {
        (self.0 & cfg::INTENS_MASK) >> cfg::INTENS_SHIFT
    }

    /// SLEEP: the chip is in low-power sleep.
    pub fn sleeping(self) -> bool {
        self.is_set(cfg::SLEEP)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::RESET
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02X} (io={:?}, drive={:?}, sleep={})",
            self.0,
            self.io_direction(),
            self.drive_mode(),
            self.sleeping()
        )
    }
}
