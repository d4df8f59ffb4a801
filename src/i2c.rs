//! Command encoding and raw bus access for the CH423.
//!
//! The CH423 does not decode a register offset. Each command is sent to its
//! own 7-bit I2C address with exactly one byte of payload, so a "register
//! write" is a one-byte I2C write and a "register read" a one-byte I2C read.

use crate::consts::cmd;
use crate::device::Inner;
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;
use log::trace;
use std::fmt;

/// A logical CH423 command, encoded on the bus as a device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Write OC0-OC7 (lines 8-15).
    SetOcLow = cmd::SET_OC_L,
    /// Write OC8-OC15 (lines 16-23).
    SetOcHigh = cmd::SET_OC_H,
    /// Write the configuration register.
    SetConfig = cmd::SET_CFG,
    /// Read IO0-IO7 (lines 0-7).
    ReadIo = cmd::READ_IO,
    /// Write IO0-IO7 (lines 0-7).
    SetIo = cmd::SET_IO,
}

impl Command {
    /// The bus address this command is sent to.
    #[inline]
    pub fn address(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the only read-type command.
    #[inline]
    pub fn is_read(self) -> bool {
        self == Command::ReadIo
    }

    fn name(self) -> &'static str {
        match self {
            Command::SetOcLow => "set OC low",
            Command::SetOcHigh => "set OC high",
            Command::SetConfig => "set config",
            Command::ReadIo => "read IO",
            Command::SetIo => "set IO",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CMD 0x{:02X} ({})", self.address(), self.name())
    }
}

impl<I2C: I2c> Inner<I2C> {
    // Callers hold the controller lock for the whole transaction.
    pub(crate) fn write_command(&mut self, command: Command, value: u8) -> Result<()> {
        debug_assert!(!command.is_read());
        trace!("I2C write {} = 0x{:02X}", command, value);
        self.i2c
            .write(command.address(), &[value])
            .map_err(|e| Error::from_bus(command, e))
    }

    pub(crate) fn read_command(&mut self, command: Command) -> Result<u8> {
        debug_assert!(command.is_read());
        let mut buf = [0u8; 1];
        self.i2c
            .read(command.address(), &mut buf)
            .map_err(|e| Error::from_bus(command, e))?;
        trace!("I2C read {} -> 0x{:02X}", command, buf[0]);
        Ok(buf[0])
    }
}
