//! Transceiver GPO bank driven through its register interface
//!
//! Without a CARP, personality card GPO pins are wired straight to the
//! transceiver's general purpose outputs. Those outputs follow a data
//! register once register GPO mode is enabled in the control register.
//! The register state is never cached: every update is a fresh
//! read-modify-write, which is not atomic across callers sharing a device.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{check_arity, LineError};
use crate::platform::RegisterDevice;

/// GPO control register
pub const GPO_CTRL_REGISTER: u16 = 0x26;

/// Bit in [`GPO_CTRL_REGISTER`] enabling register GPO mode
pub const GPO_CTRL_ENABLE_BIT: u8 = 4;

/// GPO data register
pub const GPO_DATA_REGISTER: u16 = 0x27;

/// Width of the GPO data register in bits
pub const GPO_REGISTER_WIDTH: u8 = 8;

/// Transceiver GPO pins as bit positions in [`GPO_DATA_REGISTER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdGpo {
    Gpo0 = 4,
    Gpo1 = 5,
    Gpo2 = 6,
    Gpo3 = 7,
}

impl AdGpo {
    /// Bit position in the data register
    pub fn pin(self) -> u8 {
        self as u8
    }
}

/// Register GPO bank of one transceiver
pub struct GpoController {
    device: Arc<dyn RegisterDevice>,
}

impl GpoController {
    /// Take control of `device` and enable register GPO mode
    pub fn open(device: Arc<dyn RegisterDevice>) -> Result<Self, LineError> {
        let ctrl = Self { device };
        ctrl.enable_register_mode()?;
        Ok(ctrl)
    }

    /// Set the register GPO mode bit, leaving the rest of the control
    /// register as read
    pub fn enable_register_mode(&self) -> Result<(), LineError> {
        let ctrl = self.device.read_register(GPO_CTRL_REGISTER)?;
        self.device
            .write_register(GPO_CTRL_REGISTER, ctrl | (1 << GPO_CTRL_ENABLE_BIT))?;
        debug!("Register GPO mode enabled");
        Ok(())
    }

    /// Read the data register
    pub fn read(&self) -> Result<u8, LineError> {
        self.device.read_register(GPO_DATA_REGISTER)
    }

    /// Drive one pin: `0` clears its bit, anything else sets it
    pub fn set_value(&self, pin: u8, value: u8) -> Result<(), LineError> {
        let mask = pin_mask(pin)?;
        if value == 0 {
            self.update(0, mask)
        } else {
            self.update(mask, 0)
        }
    }

    /// Set and clear bits of the data register in one read-modify-write
    pub fn update(&self, set: u8, clear: u8) -> Result<(), LineError> {
        let current = self.read()?;
        self.device
            .write_register(GPO_DATA_REGISTER, (current & !clear) | set)
    }
}

impl fmt::Debug for GpoController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpoController").finish_non_exhaustive()
    }
}

fn pin_mask(pin: u8) -> Result<u8, LineError> {
    if pin >= GPO_REGISTER_WIDTH {
        return Err(LineError::PinOutOfRange {
            pin,
            width: GPO_REGISTER_WIDTH,
        });
    }
    Ok(1 << pin)
}

/// Pins of a shared [`GpoController`]
#[derive(Debug, Clone)]
pub struct GpoLines {
    ctrl: Arc<GpoController>,
    pins: Vec<u8>,
}

impl GpoLines {
    /// Bind `pins` on `ctrl`
    pub fn new(ctrl: Arc<GpoController>, pins: &[AdGpo]) -> Self {
        Self {
            ctrl,
            pins: pins.iter().map(|p| p.pin()).collect(),
        }
    }

    /// Bound bit positions
    pub fn pins(&self) -> &[u8] {
        &self.pins
    }

    /// Number of pins
    pub fn arity(&self) -> usize {
        self.pins.len()
    }

    /// Drive every pin with a single read-modify-write of the data register
    pub fn set_values(&self, levels: &[u8]) -> Result<(), LineError> {
        check_arity(self.arity(), levels)?;

        let (mut set, mut clear) = (0u8, 0u8);
        for (&pin, &level) in self.pins.iter().zip(levels) {
            let mask = pin_mask(pin)?;
            if level == 0 {
                set &= !mask;
                clear |= mask;
            } else {
                clear &= !mask;
                set |= mask;
            }
        }
        self.ctrl.update(set, clear)
    }
}
