//! # ch423
//!
//! A Rust driver for the WCH CH423 GPIO expander, built on the
//! `embedded-hal` 1.0 I²C traits.
//!
//! The CH423 is both a GPIO expander and a LED driver. Only the GPIO side is
//! supported; the LED scanning modes use the same pins differently.
//!
//! ## Features
//!
//! *   Reset sequence on attach that drives every register to a known state.
//! *   Strongly-typed `GpioPin` struct (lines 0-23).
//! *   Single line and bulk (masked) output writes.
//! *   Reading the bidirectional lines.
//! *   Setting/getting direction of the bidirectional bank.
//! *   Push-pull or open-drain output-only lines.
//! *   Minimal bus traffic: a register is only written when its value changes.
//! *   `embedded-hal` digital pin handles (`Ch423::pin`).
//!
//! ## Chip Limitations
//!
//! *   **Lines 0-7** (IO0-IO7) are input or output, but only as a group
//!     (IO_OE configuration bit). Changing the direction of one changes all.
//! *   **Lines 8-23** (OC0-OC15) are output only. They are push-pull by
//!     default or open-drain (OD_EN configuration bit), again for all of
//!     them at once. Their level cannot be read back from the chip.
//! *   **No device address.** Each command is an I²C address (0x22, 0x23,
//!     0x24, 0x26 and 0x30 are used here; 0x31-0x3F exist too). The chip
//!     should be the only device on its bus.
//! *   **Write-only registers.** The configuration and output registers
//!     cannot be read, so the driver keeps a shadow copy of each and assumes
//!     the documented power-on state until it has written them.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use ch423::{Ch423, GpioDirection, GpioLevel, GpioPin, Result};
//! # fn bus() -> embedded_hal_mock::eh1::i2c::Mock { unimplemented!() }
//!
//! fn main() -> Result<()> {
//!     // Any embedded_hal::i2c::I2c implementation.
//!     let i2c = bus();
//!
//!     // Runs the reset sequence: IO lines input, OC lines low.
//!     let chip = Ch423::new(i2c)?;
//!
//!     // OC lines are always outputs.
//!     let oc0 = GpioPin::new(8)?;
//!     chip.gpio_write(oc0, GpioLevel::High)?;
//!
//!     // Turning IO0 into an output turns IO0-IO7 into outputs.
//!     let io0 = GpioPin::new(0)?;
//!     chip.gpio_set_direction_output(io0, GpioLevel::Low)?;
//!     assert_eq!(chip.gpio_get_direction(GpioPin::new(5)?)?, GpioDirection::Output);
//!
//!     // Update several lines with at most one write per bank.
//!     chip.gpio_write_masked(0xFF_0000, 0xAA_0000)?;
//!
//!     let _bus = chip.release();
//!     Ok(())
//! }
//! ```
//!
//! ## Error Recovery
//!
//! Bus errors are returned unmodified and never retried. A failed multi-bank
//! write is not rolled back: banks written before the failure keep their new
//! value. Registers involved in a failed write are always rewritten by the
//! next operation touching them, and `Ch423::resync` rewrites everything.
//!
//! ## Pin Mapping
//!
//! *   IO0-IO7 map to `GpioPin(0)`-`GpioPin(7)` (command 0x30 / 0x26).
//! *   OC0-OC7 map to `GpioPin(8)`-`GpioPin(15)` (command 0x22).
//! *   OC8-OC15 map to `GpioPin(16)`-`GpioPin(23)` (command 0x23).

mod consts;
mod device;
mod error;
pub mod config;
pub mod gpio;
pub mod i2c;
pub mod pin;

pub use config::Config;
pub use device::{Ch423, ShadowState};
pub use error::{Error, Result};
pub use gpio::{Bank, DriveMode, GpioDirection, GpioLevel, GpioPin};
pub use i2c::Command;
pub use pin::Pin;
// Re-export only essential public constants
pub use consts::{IO_LINE_COUNT, LABEL, LINE_COUNT};
