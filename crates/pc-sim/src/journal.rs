//! Hardware transaction journal

use std::fmt;

/// One observable hardware access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// A line request was driven
    LinesSet {
        chip: u32,
        offsets: Vec<u32>,
        values: Vec<u8>,
    },
    /// A register was read
    RegisterRead {
        device: String,
        address: u16,
        value: u8,
    },
    /// A register was written
    RegisterWrite {
        device: String,
        address: u16,
        value: u8,
    },
    /// A block was written on an I2C bus
    BusWrite {
        bus: u32,
        address: u8,
        register: u8,
        data: Vec<u8>,
    },
    /// The caller blocked for a fixed time
    Delay { ms: u32 },
}

impl Transaction {
    /// Whether this transaction changed hardware state
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Transaction::RegisterRead { .. } | Transaction::Delay { .. }
        )
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::LinesSet {
                chip,
                offsets,
                values,
            } => write!(f, "gpiochip{} {:?} <- {:?}", chip, offsets, values),
            Transaction::RegisterRead {
                device,
                address,
                value,
            } => write!(f, "{} [0x{:02X}] -> 0x{:02X}", device, address, value),
            Transaction::RegisterWrite {
                device,
                address,
                value,
            } => write!(f, "{} [0x{:02X}] <- 0x{:02X}", device, address, value),
            Transaction::BusWrite {
                bus,
                address,
                register,
                data,
            } => write!(
                f,
                "i2c-{} 0x{:02X} reg 0x{:02X} <- {:02X?}",
                bus, address, register, data
            ),
            Transaction::Delay { ms } => write!(f, "delay {}ms", ms),
        }
    }
}
