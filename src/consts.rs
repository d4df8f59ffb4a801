//! Internal constants, command addresses, and bit definitions.

/// Label of the line provider, as seen by pin consumers.
pub const LABEL: &str = "ch423";

/// Total number of exposed lines (IO0-IO7 followed by OC0-OC15).
pub const LINE_COUNT: u8 = 24;
/// Number of bidirectional lines (IO0-IO7).
pub const IO_LINE_COUNT: u8 = 8;

/// Mask covering every line of the 24-bit output word.
pub const OUTPUT_MASK: u32 = 0x00FF_FFFF;

// --- Commands ---
// The chip has no address of its own: every command is an I2C address.
// 0x31 to 0x3F also exist (LED scanning) but are not used here.
pub mod cmd {
    /// Set the low output-only bank (OC0-OC7, lines 8-15).
    pub const SET_OC_L: u8 = 0x22;
    /// Set the high output-only bank (OC8-OC15, lines 16-23).
    pub const SET_OC_H: u8 = 0x23;
    /// Write the configuration register.
    pub const SET_CFG: u8 = 0x24;
    /// Read the bidirectional bank (IO0-IO7).
    pub const READ_IO: u8 = 0x26;
    /// Set the bidirectional bank, effective only while IO_OE is set.
    pub const SET_IO: u8 = 0x30;
}

// --- Configuration register bits ---
pub mod cfg {
    /// Bidirectional bank direction (0 = input, 1 = output).
    pub const IO_OE: u8 = 1 << 0;
    /// Low decoder enable (LED mode).
    pub const DEC_L: u8 = 1 << 1;
    /// High decoder enable (LED mode).
    pub const DEC_H: u8 = 1 << 2;
    /// External interrupt enable.
    pub const X_INT: u8 = 1 << 3;
    /// Open-drain outputs for both output-only banks.
    pub const OD_EN: u8 = 1 << 4;
    /// LED intensity field, bits 6:5.
    pub const INTENS_MASK: u8 = 0b0110_0000;
    /// Position of the intensity field.
    pub const INTENS_SHIFT: u8 = 5;
    /// Low-power sleep.
    pub const SLEEP: u8 = 1 << 7;

    /// Value written at attach: IO lines input, no decoder, push-pull, awake.
    pub const RESET_VALUE: u8 = 0x00;
    /// Shadow value before the first write. Never a value this driver writes,
    /// so the first configuration write cannot be skipped.
    pub const UNKNOWN: u8 = 0xFF;
}

/// Output shadow assumed at power-up: OC lines high, IO latch low.
pub const POWER_ON_OUTPUTS: u32 = 0x00FF_FF00;
