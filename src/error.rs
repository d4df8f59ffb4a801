use crate::i2c::Command;
use thiserror::Error;

/// Errors that can occur when driving a CH423.
///
/// Transport failures (`Nack`, `ArbitrationLost`, `Bus`) abort the current
/// operation and are returned unmodified; nothing is retried at this layer.
#[derive(Error, Debug)]
pub enum Error {
    /// The chip did not acknowledge a command.
    #[error(
        "No acknowledge for {command}: the CH423 did not respond. Check power, wiring and that it is alone on its bus."
    )]
    Nack {
        /// The command (bus address) that was not acknowledged.
        command: Command,
    },
    /// Bus arbitration was lost during a command.
    #[error(
        "I2C bus conflict during {command}: arbitration lost. The CH423 uses addresses 0x22-0x3F and must be the only device on its bus."
    )]
    ArbitrationLost {
        /// The command being issued when arbitration was lost.
        command: Command,
    },
    /// Any other transport failure reported by the bus implementation.
    #[error("I2C transfer failed during {command}: {kind}")]
    Bus {
        /// The command being issued when the failure occurred.
        command: Command,
        /// Transport-level classification of the failure.
        kind: embedded_hal::i2c::ErrorKind,
    },
    /// Line number is outside the valid range for this chip.
    #[error("GPIO line {pin} argument out of range (0-23): {message}")]
    PinArgumentOutOfRange {
        /// The invalid line number that was specified.
        pin: u8,
        /// Detailed error message explaining the constraint.
        message: String,
    },
    /// The requested change does not apply to this line.
    #[error("Invalid argument for GPIO line {pin}: {message}")]
    InvalidArgument {
        /// The line the operation was requested on.
        pin: u8,
        /// Detailed error message explaining the constraint.
        message: String,
    },
    /// Feature is not supported by the chip or by this driver.
    #[error("Feature not supported: {0}")]
    UnsupportedFeature(String),
    /// A previous holder of the controller lock panicked mid-operation.
    #[error("CH423 state lock poisoned; cached register values can no longer be trusted")]
    LockPoisoned,
}

impl Error {
    /// Maps a bus error to the matching transport variant.
    pub(crate) fn from_bus<E: embedded_hal::i2c::Error>(command: Command, err: E) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match err.kind() {
            ErrorKind::NoAcknowledge(_) => Error::Nack { command },
            ErrorKind::ArbitrationLoss => Error::ArbitrationLost { command },
            kind => Error::Bus { command, kind },
        }
    }

    /// Returns `true` if the error comes from a failed bus transaction.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Nack { .. } | Error::ArbitrationLost { .. } | Error::Bus { .. }
        )
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Result type alias for CH423 operations.
pub type Result<T> = std::result::Result<T, Error>;

// Helpers for the two argument errors the pin API reports
pub(crate) fn output_only_direction(pin: u8) -> Error {
    Error::InvalidArgument {
        pin,
        message: "lines 8-23 (OC0-OC15) are output only".to_string(),
    }
}
pub(crate) fn unsupported_io_drive_mode(pin: u8) -> Error {
    Error::UnsupportedFeature(format!(
        "Drive mode of line {} cannot be changed: only lines 8-23 (OC0-OC15) support open-drain",
        pin
    ))
}
