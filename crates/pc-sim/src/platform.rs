//! Simulated platform services

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use pc_gpio::mux::{decode, MUX_CLOCK, MUX_INPUT_SELECT, MUX_OUTPUT_SELECT, MUX_RESET, MUX_WIDTH};
use pc_gpio::platform::{
    BlockBus, Delay, GpioChip, LineRequest, Platform, RegisterDevice, BASE_GPIO_CHIP,
};
use pc_gpio::LineError;
use tracing::trace;

use crate::journal::Transaction;

#[derive(Debug, Default)]
struct SimState {
    journal: Vec<Transaction>,
    levels: HashMap<(u32, u32), u8>,
    consumers: HashMap<(u32, u32), String>,
    registers: HashMap<(String, u16), u8>,
    offline: HashSet<String>,
    write_budgets: HashMap<String, usize>,
    mux: Option<MuxFabric>,
}

/// Routing latched in the CARP mux fabric
///
/// Follows the line protocol: select lines are sampled on the rising clock
/// edge and a low reset line returns every route to output 0.
#[derive(Debug, Default)]
struct MuxFabric {
    input_select: [u8; MUX_WIDTH],
    output_select: [u8; MUX_WIDTH],
    routes: HashMap<u8, u8>,
}

impl MuxFabric {
    fn observe(&mut self, offsets: &[u32], values: &[u8]) {
        if offsets == MUX_INPUT_SELECT {
            self.input_select.copy_from_slice(values);
        } else if offsets == MUX_OUTPUT_SELECT {
            self.output_select.copy_from_slice(values);
        } else if offsets == [MUX_CLOCK] && values == [1] {
            self.routes
                .insert(decode(&self.input_select), decode(&self.output_select));
        }
    }
}

impl SimState {
    fn check_online(&self, resource: &str) -> Result<(), LineError> {
        if self.offline.contains(resource) {
            return Err(LineError::unavailable(resource, "offline"));
        }
        Ok(())
    }

    /// Spend one write from `resource`'s budget, if it has one
    fn spend_write(&mut self, resource: &str) -> Result<(), LineError> {
        match self.write_budgets.get_mut(resource) {
            Some(0) => Err(LineError::unavailable(resource, "write failed")),
            Some(budget) => {
                *budget -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn observe_lines(&mut self, chip: u32, offsets: &[u32], values: &[u8]) {
        if chip != BASE_GPIO_CHIP {
            return;
        }
        if offsets == [MUX_RESET] && values == [0] {
            self.mux = Some(MuxFabric::default());
        } else if let Some(fabric) = self.mux.as_mut() {
            fabric.observe(offsets, values);
        }
    }

    fn record(&mut self, transaction: Transaction) {
        trace!("sim: {}", transaction);
        self.journal.push(transaction);
    }
}

type Shared = Arc<Mutex<SimState>>;

fn lock(state: &Shared) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn chip_name(index: u32) -> String {
    format!("gpiochip{}", index)
}

fn bus_name(bus: u32) -> String {
    format!("i2c-{}", bus)
}

/// In-memory platform
///
/// Clones share state, so a test can keep one clone for assertions while a
/// controller owns the handles it opened.
#[derive(Debug, Clone, Default)]
pub struct SimPlatform {
    state: Shared,
}

impl SimPlatform {
    /// Create an empty platform: all lines unrequested, all registers zero
    pub fn new() -> Self {
        Self::default()
    }

    /// All transactions so far
    pub fn journal(&self) -> Vec<Transaction> {
        lock(&self.state).journal.clone()
    }

    /// Take all transactions so far, leaving the journal empty
    pub fn drain_journal(&self) -> Vec<Transaction> {
        std::mem::take(&mut lock(&self.state).journal)
    }

    /// Number of transactions that changed hardware state
    pub fn write_count(&self) -> usize {
        lock(&self.state)
            .journal
            .iter()
            .filter(|t| t.is_write())
            .count()
    }

    /// Current level of a line, if it was ever driven
    pub fn line_level(&self, chip: u32, offset: u32) -> Option<u8> {
        lock(&self.state).levels.get(&(chip, offset)).copied()
    }

    /// Consumer label of a requested line
    pub fn consumer(&self, chip: u32, offset: u32) -> Option<String> {
        lock(&self.state).consumers.get(&(chip, offset)).cloned()
    }

    /// Current register value (zero if never written)
    pub fn register(&self, device: &str, address: u16) -> u8 {
        lock(&self.state)
            .registers
            .get(&(device.to_string(), address))
            .copied()
            .unwrap_or(0)
    }

    /// Preload a register without journaling it
    pub fn set_register(&self, device: &str, address: u16, value: u8) {
        lock(&self.state)
            .registers
            .insert((device.to_string(), address), value);
    }

    /// Blocks written on `bus`, as (address, register, data)
    pub fn bus_writes(&self, bus: u32) -> Vec<(u8, u8, Vec<u8>)> {
        lock(&self.state)
            .journal
            .iter()
            .filter_map(|t| match t {
                Transaction::BusWrite {
                    bus: b,
                    address,
                    register,
                    data,
                } if *b == bus => Some((*address, *register, data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Output value latched for CARP mux input `input`
    ///
    /// `None` until the mux has been reset at least once; inputs never
    /// latched since the last reset read as output 0 (low).
    pub fn mux_route(&self, input: u8) -> Option<u8> {
        lock(&self.state)
            .mux
            .as_ref()
            .map(|fabric| fabric.routes.get(&input).copied().unwrap_or(0))
    }

    /// Take a resource (`gpiochip<n>`, `i2c-<n>` or a device name) offline
    /// or bring it back
    pub fn set_offline(&self, resource: &str, offline: bool) {
        let mut state = lock(&self.state);
        if offline {
            state.offline.insert(resource.to_string());
        } else {
            state.offline.remove(resource);
        }
    }

    /// Let the next `writes` writes to `resource` succeed, then fail every
    /// write after them until [`SimPlatform::clear_failures`]
    pub fn fail_after(&self, resource: &str, writes: usize) {
        lock(&self.state)
            .write_budgets
            .insert(resource.to_string(), writes);
    }

    /// Remove every write budget set by [`SimPlatform::fail_after`]
    pub fn clear_failures(&self) {
        lock(&self.state).write_budgets.clear();
    }
}

impl Platform for SimPlatform {
    fn gpio_chip(&self, index: u32) -> Result<Arc<dyn GpioChip>, LineError> {
        lock(&self.state).check_online(&chip_name(index))?;
        Ok(Arc::new(SimChip {
            index,
            state: self.state.clone(),
        }))
    }

    fn register_device(&self, name: &str) -> Result<Arc<dyn RegisterDevice>, LineError> {
        lock(&self.state).check_online(name)?;
        Ok(Arc::new(SimRegisterDevice {
            name: name.to_string(),
            state: self.state.clone(),
        }))
    }

    fn block_bus(&self, bus: u32) -> Result<Box<dyn BlockBus>, LineError> {
        lock(&self.state).check_online(&bus_name(bus))?;
        Ok(Box::new(SimBus {
            bus,
            state: self.state.clone(),
        }))
    }

    fn delay(&self) -> Box<dyn Delay> {
        Box::new(SimDelay {
            state: self.state.clone(),
        })
    }
}

/// Simulated GPIO chip
///
/// A line can only be held by one request at a time; dropping the request
/// releases it.
#[derive(Debug)]
pub struct SimChip {
    index: u32,
    state: Shared,
}

impl GpioChip for SimChip {
    fn request_lines(
        &self,
        offsets: &[u32],
        consumer: &str,
    ) -> Result<Box<dyn LineRequest>, LineError> {
        let name = chip_name(self.index);
        let mut state = lock(&self.state);
        state.check_online(&name)?;

        if let Some(holder) = offsets
            .iter()
            .find_map(|&offset| state.consumers.get(&(self.index, offset)))
        {
            return Err(LineError::unavailable(
                name,
                format!("line busy (held by {})", holder),
            ));
        }

        for &offset in offsets {
            state
                .consumers
                .insert((self.index, offset), consumer.to_string());
        }

        Ok(Box::new(SimLineRequest {
            chip: self.index,
            offsets: offsets.to_vec(),
            state: self.state.clone(),
        }))
    }
}

#[derive(Debug)]
struct SimLineRequest {
    chip: u32,
    offsets: Vec<u32>,
    state: Shared,
}

impl LineRequest for SimLineRequest {
    fn set_values(&self, values: &[u8]) -> Result<(), LineError> {
        let name = chip_name(self.chip);
        let mut state = lock(&self.state);
        state.check_online(&name)?;

        if values.len() != self.offsets.len() {
            return Err(LineError::InvalidArity {
                expected: self.offsets.len(),
                actual: values.len(),
            });
        }
        state.spend_write(&name)?;

        for (&offset, &value) in self.offsets.iter().zip(values) {
            state.levels.insert((self.chip, offset), value);
        }
        state.observe_lines(self.chip, &self.offsets, values);
        state.record(Transaction::LinesSet {
            chip: self.chip,
            offsets: self.offsets.clone(),
            values: values.to_vec(),
        });
        Ok(())
    }
}

impl Drop for SimLineRequest {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        for &offset in &self.offsets {
            state.consumers.remove(&(self.chip, offset));
        }
    }
}

/// Simulated register device
#[derive(Debug)]
pub struct SimRegisterDevice {
    name: String,
    state: Shared,
}

impl RegisterDevice for SimRegisterDevice {
    fn read_register(&self, address: u16) -> Result<u8, LineError> {
        let mut state = lock(&self.state);
        state.check_online(&self.name)?;

        let value = state
            .registers
            .get(&(self.name.clone(), address))
            .copied()
            .unwrap_or(0);
        state.record(Transaction::RegisterRead {
            device: self.name.clone(),
            address,
            value,
        });
        Ok(value)
    }

    fn write_register(&self, address: u16, value: u8) -> Result<(), LineError> {
        let mut state = lock(&self.state);
        state.check_online(&self.name)?;
        state.spend_write(&self.name)?;

        state.registers.insert((self.name.clone(), address), value);
        state.record(Transaction::RegisterWrite {
            device: self.name.clone(),
            address,
            value,
        });
        Ok(())
    }
}

/// Simulated I2C bus
#[derive(Debug)]
pub struct SimBus {
    bus: u32,
    state: Shared,
}

impl BlockBus for SimBus {
    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), LineError> {
        let name = bus_name(self.bus);
        let mut state = lock(&self.state);
        state.check_online(&name)?;
        state.spend_write(&name)?;

        state.record(Transaction::BusWrite {
            bus: self.bus,
            address,
            register,
            data: data.to_vec(),
        });
        Ok(())
    }
}

/// Delay that journals instead of sleeping
#[derive(Debug)]
pub struct SimDelay {
    state: Shared,
}

impl Delay for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        lock(&self.state).record(Transaction::Delay { ms });
    }
}
