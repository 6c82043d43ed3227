//! CARP FPGA line mux
//!
//! The CARP carrier board routes personality card GPO pins through a line
//! mux in the FPGA fabric. The mux is driven over eight select lines and a
//! clock on the base GPIO chip:
//!
//! - the 4 **input select** lines name the personality card pin being
//!   configured ([`CarpInput`])
//! - the 4 **output select** lines name what that pin is connected to
//!   ([`CarpOutput`]): a constant low/high or one of the transceiver GPOs
//! - a high-then-low pulse on the clock latches the pairing
//!
//! Selectors are sent MSB first, zero padded to [`MUX_WIDTH`] bits.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{check_arity, LineError};
use crate::platform::{GpioChip, LineRequest};
use crate::{HIGH, LOW};

/// Clock line latching one input/output pairing
pub const MUX_CLOCK: u32 = 78;

/// Reset line, active low
pub const MUX_RESET: u32 = 79;

/// Output select lines, MSB first
pub const MUX_OUTPUT_SELECT: [u32; MUX_WIDTH] = [83, 82, 81, 80];

/// Input select lines, MSB first
pub const MUX_INPUT_SELECT: [u32; MUX_WIDTH] = [87, 86, 85, 84];

/// Width of each selector in bits
pub const MUX_WIDTH: usize = 4;

const MUX_CONSUMER: &str = "GPIO_MUX";

/// Encode a selector as MSB-first bits
pub fn encode(value: u8) -> Result<[u8; MUX_WIDTH], LineError> {
    if usize::from(value) >> MUX_WIDTH != 0 {
        return Err(LineError::EncodingOverflow {
            value,
            bits: MUX_WIDTH,
        });
    }

    let mut bits = [0u8; MUX_WIDTH];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (value >> (MUX_WIDTH - 1 - i)) & 1;
    }
    Ok(bits)
}

/// Decode MSB-first bits back into a selector
pub fn decode(bits: &[u8; MUX_WIDTH]) -> u8 {
    bits.iter().fold(0, |acc, &bit| (acc << 1) | (bit & 1))
}

/// Personality card GPO pins reachable through the mux
///
/// Named `RFP_<socket>_ADGPO_<pin>`: the GPO pin a personality card in
/// `socket` expects to be wired to on the transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CarpInput {
    Rfp0AdGpo1 = 0,
    Rfp0AdGpo2 = 1,
    Rfp1AdGpo0 = 2,
    Rfp1AdGpo1 = 3,
    Rfp1AdGpo2 = 4,
    Rfp2AdGpo0 = 5,
    Rfp2AdGpo1 = 6,
    Rfp2AdGpo2 = 7,
    Rfp3AdGpo0 = 8,
    Rfp3AdGpo2 = 9,
}

impl CarpInput {
    /// Selector value sent on the input select lines
    pub fn selector(self) -> u8 {
        self as u8
    }

    /// Pin wired as the TX enable of the card in `slot`
    pub fn tx_enable(slot: u8) -> Option<Self> {
        match slot {
            0 => Some(Self::Rfp0AdGpo2),
            1 => Some(Self::Rfp1AdGpo2),
            2 => Some(Self::Rfp2AdGpo2),
            3 => Some(Self::Rfp3AdGpo2),
            _ => None,
        }
    }

    /// Pins wired as the two auxiliary enables (GPO 0 and 1) of the card in
    /// `slot`, where both exist
    pub fn aux_enables(slot: u8) -> Option<[Self; 2]> {
        match slot {
            1 => Some([Self::Rfp1AdGpo0, Self::Rfp1AdGpo1]),
            2 => Some([Self::Rfp2AdGpo0, Self::Rfp2AdGpo1]),
            _ => None,
        }
    }

    /// Returns the pin name as printed on the CARP schematic
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rfp0AdGpo1 => "RFP_0_ADGPO_1",
            Self::Rfp0AdGpo2 => "RFP_0_ADGPO_2",
            Self::Rfp1AdGpo0 => "RFP_1_ADGPO_0",
            Self::Rfp1AdGpo1 => "RFP_1_ADGPO_1",
            Self::Rfp1AdGpo2 => "RFP_1_ADGPO_2",
            Self::Rfp2AdGpo0 => "RFP_2_ADGPO_0",
            Self::Rfp2AdGpo1 => "RFP_2_ADGPO_1",
            Self::Rfp2AdGpo2 => "RFP_2_ADGPO_2",
            Self::Rfp3AdGpo0 => "RFP_3_ADGPO_0",
            Self::Rfp3AdGpo2 => "RFP_3_ADGPO_2",
        }
    }
}

/// Values a mux input can be connected to
///
/// `Low` and `High` are constants; the rest are `AD_<transceiver>_RFIC_GPO_<pin>`
/// lines driven by a transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CarpOutput {
    Low = 0,
    High = 1,
    Ad0RficGpo0 = 2,
    Ad0RficGpo1 = 3,
    Ad0RficGpo2 = 4,
    Ad0RficGpo3 = 5,
    Ad1RficGpo0 = 6,
    Ad1RficGpo1 = 7,
    Ad1RficGpo2 = 8,
    Ad1RficGpo3 = 9,
}

impl CarpOutput {
    /// Selector value sent on the output select lines
    pub fn selector(self) -> u8 {
        self as u8
    }

    /// Constant output for a logic level
    pub fn level(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Handle to the CARP line mux
pub struct LineMux {
    clock: Box<dyn LineRequest>,
    reset: Box<dyn LineRequest>,
    input_select: Box<dyn LineRequest>,
    output_select: Box<dyn LineRequest>,
}

impl LineMux {
    /// Request the mux lines from the base chip and reset the fabric
    pub fn open(chip: &dyn GpioChip) -> Result<Self, LineError> {
        let mux = Self {
            clock: chip.request_lines(&[MUX_CLOCK], MUX_CONSUMER)?,
            reset: chip.request_lines(&[MUX_RESET], MUX_CONSUMER)?,
            input_select: chip.request_lines(&MUX_INPUT_SELECT, MUX_CONSUMER)?,
            output_select: chip.request_lines(&MUX_OUTPUT_SELECT, MUX_CONSUMER)?,
        };
        mux.reset()?;
        debug!("CARP line mux opened");
        Ok(mux)
    }

    /// Return every mux output to logic low
    pub fn reset(&self) -> Result<(), LineError> {
        self.reset.set_values(&[LOW])?;
        self.reset.set_values(&[HIGH])
    }

    /// Latch the current select lines
    fn pulse(&self) -> Result<(), LineError> {
        self.clock.set_values(&[HIGH])?;
        self.clock.set_values(&[LOW])
    }

    /// Connect mux input `input` to output value `output`
    pub fn connect(&self, input: u8, output: u8) -> Result<(), LineError> {
        let input_bits = encode(input)?;
        let output_bits = encode(output)?;
        self.latch(&input_bits, &output_bits)
    }

    fn latch(
        &self,
        input_bits: &[u8; MUX_WIDTH],
        output_bits: &[u8; MUX_WIDTH],
    ) -> Result<(), LineError> {
        trace!("Mux latch {:?} <- {:?}", input_bits, output_bits);
        self.input_select.set_values(input_bits)?;
        self.output_select.set_values(output_bits)?;
        self.pulse()
    }
}

impl fmt::Debug for LineMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineMux").finish_non_exhaustive()
    }
}

/// Personality card pins driven through a shared [`LineMux`]
#[derive(Debug, Clone)]
pub struct MuxLines {
    mux: Arc<LineMux>,
    inputs: Vec<CarpInput>,
}

impl MuxLines {
    /// Bind `inputs` on `mux`
    pub fn new(mux: Arc<LineMux>, inputs: &[CarpInput]) -> Self {
        Self {
            mux,
            inputs: inputs.to_vec(),
        }
    }

    /// Bound mux inputs
    pub fn inputs(&self) -> &[CarpInput] {
        &self.inputs
    }

    /// Number of pins
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Connect each pin to the output value at the same position
    ///
    /// Levels `0` and `1` select [`CarpOutput::Low`] and [`CarpOutput::High`].
    /// Every value is encoded before the first latch, so an out-of-range
    /// value leaves the fabric untouched.
    pub fn set_values(&self, values: &[u8]) -> Result<(), LineError> {
        check_arity(self.arity(), values)?;

        let transactions = self
            .inputs
            .iter()
            .zip(values)
            .map(|(input, &value)| Ok((encode(input.selector())?, encode(value)?)))
            .collect::<Result<Vec<_>, LineError>>()?;

        for (input_bits, output_bits) in &transactions {
            self.mux.latch(input_bits, output_bits)?;
        }
        Ok(())
    }

    /// Connect every pin to `output`
    pub fn route(&self, output: CarpOutput) -> Result<(), LineError> {
        let values = vec![output.selector(); self.arity()];
        self.set_values(&values)
    }
}
