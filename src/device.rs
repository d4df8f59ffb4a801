//! Controller state and the register-level state machine of the CH423.

use crate::config::Config;
use crate::consts;
use crate::error::{Error, Result};
use crate::gpio::{Bank, GpioDirection};
use crate::i2c::Command;
use embedded_hal::i2c::I2c;
use log::{debug, trace, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Snapshot of the controller's cached view of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowState {
    /// Last configuration value successfully written.
    pub config: Config,
    /// Direction of the bidirectional bank (IO0-IO7).
    pub direction: GpioDirection,
    /// Output word for lines 0-23. Bits 0-7 are the latched IO values.
    pub outputs: u32,
    /// `false` after a failed write until the affected registers were
    /// written again successfully (or [`Ch423::resync`] succeeded).
    pub synchronized: bool,
}

// Shadow copies of the write-only registers.
#[derive(Debug)]
pub(crate) struct Shadow {
    pub(crate) config: Config,
    pub(crate) direction: GpioDirection,
    pub(crate) outputs: u32,
    config_stale: bool,
    // One flag per Bank; the hardware value of a flagged bank is unknown.
    stale_banks: u8,
}

impl Shadow {
    fn power_on() -> Self {
        Shadow {
            config: Config::UNKNOWN,
            direction: GpioDirection::Input,
            outputs: consts::POWER_ON_OUTPUTS,
            config_stale: true,
            stale_banks: 0,
        }
    }

    #[inline]
    pub(crate) fn is_stale(&self, bank: Bank) -> bool {
        self.stale_banks & bank.flag() != 0
    }

    fn set_stale(&mut self, bank: Bank, stale: bool) {
        if stale {
            self.stale_banks |= bank.flag();
        } else {
            self.stale_banks &= !bank.flag();
        }
    }

    fn store(&mut self, bank: Bank, value: u8) {
        self.outputs = (self.outputs & !bank.mask()) | ((value as u32) << bank.shift());
    }

    fn is_synchronized(&self) -> bool {
        // A stale IO latch only matters once the bank drives the pins.
        let io_live = self.direction == GpioDirection::Output;
        !self.config_stale
            && Bank::ALL
                .into_iter()
                .filter(|&bank| bank != Bank::Io || io_live)
                .all(|bank| !self.is_stale(bank))
    }

    fn snapshot(&self) -> ShadowState {
        ShadowState {
            config: self.config,
            direction: self.direction,
            outputs: self.outputs,
            synchronized: self.is_synchronized(),
        }
    }
}

// Everything guarded by the controller lock: the bus and the shadow.
#[derive(Debug)]
pub(crate) struct Inner<I2C> {
    pub(crate) i2c: I2C,
    pub(crate) shadow: Shadow,
}

impl<I2C: I2c> Inner<I2C> {
    /// Brings the chip to the driver's baseline. The real power-on state
    /// cannot be read back, so every register is written at least once:
    /// config 0 (IO input, push-pull, awake) and both OC banks low.
    fn reset(&mut self) -> Result<()> {
        self.shadow = Shadow::power_on();
        self.set_config(Config::RESET)?;
        self.shadow.direction = GpioDirection::Input;

        // OC lines come up high.
        self.shadow.outputs = consts::POWER_ON_OUTPUTS;
        self.write_outputs(0)
    }

    /// Writes the configuration register unless the chip already holds
    /// `config`.
    pub(crate) fn set_config(&mut self, config: Config) -> Result<()> {
        if config == self.shadow.config && !self.shadow.config_stale {
            trace!("Config already {}, no write needed", config);
            return Ok(());
        }
        debug!("Setting config {} (was 0x{:02X})", config, self.shadow.config.bits());
        match self.write_command(Command::SetConfig, config.bits()) {
            Ok(()) => {
                self.shadow.config = config;
                self.shadow.config_stale = false;
                Ok(())
            }
            Err(e) => {
                warn!("Config write failed, chip configuration unknown: {}", e);
                self.shadow.config_stale = true;
                Err(e)
            }
        }
    }

    /// Switches the bidirectional bank; the direction only changes once the
    /// configuration write succeeded.
    pub(crate) fn set_io_direction(&mut self, direction: GpioDirection) -> Result<()> {
        let config = self.shadow.config.with_io_direction(direction);
        self.set_config(config)?;
        if self.shadow.direction != direction {
            debug!("IO bank direction: {:?} -> {:?}", self.shadow.direction, direction);
            self.shadow.direction = direction;
        }
        Ok(())
    }

    /// Drives the output registers to `target`, writing only the banks that
    /// changed (or whose last write failed).
    ///
    /// Banks are written in order IO, OC low, OC high and the first failure
    /// aborts the rest. Each bank's shadow is committed right after its own
    /// write succeeds, so on error the shadow holds the new value for the
    /// banks already written and the old value for the rest.
    pub(crate) fn write_outputs(&mut self, target: u32) -> Result<()> {
        let target = target & consts::OUTPUT_MASK;
        for bank in Bank::ALL {
            let wanted = bank.byte(target);
            let current = bank.byte(self.shadow.outputs);

            if bank == Bank::Io && self.shadow.direction == GpioDirection::Input {
                // The chip ignores IO writes while IO_OE is clear. The value
                // is only kept in the shadow.
                if wanted != current {
                    trace!("IO bank is input, latching 0x{:02X} in shadow only", wanted);
                    self.shadow.store(bank, wanted);
                }
                continue;
            }

            if wanted == current && !self.shadow.is_stale(bank) {
                trace!("{:?} bank already 0x{:02X}, no write needed", bank, wanted);
                continue;
            }

            debug!("Setting {:?} bank to 0x{:02X} (was 0x{:02X})", bank, wanted, current);
            if let Err(e) = self.write_command(bank.command(), wanted) {
                warn!("{:?} bank write failed, output shadow desynchronized: {}", bank, e);
                self.shadow.set_stale(bank, true);
                return Err(e);
            }
            self.shadow.store(bank, wanted);
            self.shadow.set_stale(bank, false);
        }
        Ok(())
    }

    fn resync(&mut self) -> Result<()> {
        debug!("Resynchronizing chip registers with shadow state");
        self.shadow.config_stale = true;
        self.set_config(self.shadow.config)?;
        for bank in Bank::ALL {
            self.shadow.set_stale(bank, true);
        }
        let outputs = self.shadow.outputs;
        self.write_outputs(outputs)
    }
}

/// A CH423 GPIO expander.
///
/// All state lives behind one lock. Every operation holds it for its full
/// duration, bus transactions included, so operations are strictly
/// serialized and never observe a half-applied update. Operations block for
/// as long as the bus does.
#[derive(Debug)]
pub struct Ch423<I2C> {
    state: Mutex<Inner<I2C>>,
}

impl<I2C: I2c> Ch423<I2C> {
    // --- Constructors and Info ---

    /// Attaches to a CH423 on `i2c` and runs the reset sequence.
    ///
    /// The chip must be the only device on the bus: it answers on addresses
    /// 0x22-0x3F regardless of any configured device address. Fails if any
    /// reset write fails; the bus is dropped with the error; use
    /// [`Ch423::try_new`] to get it back.
    pub fn new(i2c: I2C) -> Result<Self> {
        Self::try_new(i2c).map_err(|(err, _)| err)
    }

    /// Like [`Ch423::new`], but hands the bus back if the reset sequence
    /// fails.
    pub fn try_new(i2c: I2C) -> std::result::Result<Self, (Error, I2C)> {
        let mut inner = Inner {
            i2c,
            shadow: Shadow::power_on(),
        };
        if let Err(err) = inner.reset() {
            warn!("CH423 reset sequence failed: {}", err);
            return Err((err, inner.i2c));
        }
        debug!("CH423 attached, {} lines", consts::LINE_COUNT);
        Ok(Self {
            state: Mutex::new(inner),
        })
    }

    /// Detaches from the chip and returns the bus. The chip keeps its
    /// current outputs; nothing is persisted.
    pub fn release(self) -> I2C {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .i2c
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Inner<I2C>>> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Returns the last configuration value written to the chip.
    pub fn config(&self) -> Result<Config> {
        Ok(self.lock()?.shadow.config)
    }

    /// Returns a snapshot of the cached chip state.
    pub fn shadow(&self) -> Result<ShadowState> {
        Ok(self.lock()?.shadow.snapshot())
    }

    /// Rewrites the configuration and every output register from the
    /// shadow, regardless of whether they appear unchanged.
    ///
    /// Use after a failed operation: a failed write may or may not have
    /// reached the chip. The IO bank is only rewritten while it is an output.
    pub fn resync(&self) -> Result<()> {
        self.lock()?.resync()
    }
}
