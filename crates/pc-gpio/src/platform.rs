//! Platform services consumed by the line backends and board controllers
//!
//! These traits are the narrow seam to the platform's GPIO chip driver, the
//! I2C bus and the transceiver's register interface. They are object-safe so
//! controllers can hold `Box<dyn ...>`/`Arc<dyn ...>` handles regardless of
//! whether the platform is real hardware or a simulation.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LineError;

/// GPIO chip carrying the base board lines, including the serial mux
pub const BASE_GPIO_CHIP: u32 = 0;

/// GPIO chip of the CARP I2C expander
pub const CARP_GPIO_CHIP: u32 = 2;

/// Register device exposing the transceiver's GPO bank
pub const TRANSCEIVER_DEVICE: &str = "ad9361-phy";

/// A group of lines requested as outputs
pub trait LineRequest: Send + Sync {
    /// Drive every line of the request, one level per line in request order
    fn set_values(&self, values: &[u8]) -> Result<(), LineError>;
}

/// A GPIO chip that hands out output line requests
pub trait GpioChip: Send + Sync {
    /// Request `offsets` as outputs, labelled with `consumer`
    fn request_lines(
        &self,
        offsets: &[u32],
        consumer: &str,
    ) -> Result<Box<dyn LineRequest>, LineError>;
}

/// A device with byte-wide registers
pub trait RegisterDevice: Send + Sync {
    /// Read one register
    fn read_register(&self, address: u16) -> Result<u8, LineError>;

    /// Write one register
    fn write_register(&self, address: u16, value: u8) -> Result<(), LineError>;
}

/// A bus supporting block writes (SMBus-style)
pub trait BlockBus: Send {
    /// Write `data` to `register` of the device at `address`
    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), LineError>;
}

/// Blocking delay provider
pub trait Delay: Send {
    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// [`Delay`] backed by the current thread sleeping
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Resolves platform identifiers to service handles
pub trait Platform {
    /// Open GPIO chip `gpiochip<index>`
    fn gpio_chip(&self, index: u32) -> Result<Arc<dyn GpioChip>, LineError>;

    /// Open a register device by name
    fn register_device(&self, name: &str) -> Result<Arc<dyn RegisterDevice>, LineError>;

    /// Open I2C bus `bus`
    fn block_bus(&self, bus: u32) -> Result<Box<dyn BlockBus>, LineError>;

    /// Delay provider for timing-sensitive sequences
    fn delay(&self) -> Box<dyn Delay> {
        Box::new(StdDelay)
    }
}
