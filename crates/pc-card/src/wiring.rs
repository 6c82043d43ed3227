//! Resolution of board pins to line handles
//!
//! A personality card's control pins reach the host one of two ways:
//!
//! - **CARP carrier**: backpack lines sit on the CARP expander chip at
//!   `6 * slot + position`, and transceiver GPO pins are routed through the
//!   FPGA line mux
//! - **Direct**: backpack lines sit at fixed offsets on the base chip, and
//!   transceiver GPO pins are bits of the transceiver GPO register
//!
//! Lines on the card itself always sit on the card's own GPIO chip.
//! [`Carrier`] opens chips, the mux and the GPO controller on first use, so
//! a board only touches the hardware its pins need and boards in different
//! slots share one mux.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use pc_gpio::platform::{
    GpioChip, Platform, BASE_GPIO_CHIP, CARP_GPIO_CHIP, TRANSCEIVER_DEVICE,
};
use pc_gpio::{
    AdGpo, CarpInput, DirectLines, GpoController, GpoLines, LineError, LineHandle, LineMux,
    MuxLines,
};
use tracing::debug;

use crate::bank::RxTxLines;
use crate::error::BoardError;

/// Backpack lines per slot on the CARP expander
pub const CARP_LINES_PER_SLOT: u32 = 6;

/// First RX control line of transceiver 0 behind a CARP carrier
pub const CARP_RX_CTRL_BASE: u32 = 132;

/// First TX control line of transceiver 0 behind a CARP carrier
pub const CARP_TX_CTRL_BASE: u32 = 133;

/// Line stride between transceivers behind a CARP carrier
pub const CARP_CTRL_STRIDE: u32 = 3;

/// RX control line without a CARP carrier
pub const RX_CTRL_LINE: u32 = 125;

/// TX control line without a CARP carrier
pub const TX_CTRL_LINE: u32 = 126;

/// Hardware shared by every board on one host
///
/// The CARP line mux and the transceiver GPO controller serve all slots, so
/// they are opened once (on first use) and handed to each board.
pub struct Carrier<'a> {
    platform: &'a dyn Platform,
    chips: RefCell<Vec<(u32, Arc<dyn GpioChip>)>>,
    mux: RefCell<Option<Arc<LineMux>>>,
    gpo: RefCell<Option<Arc<GpoController>>>,
}

impl<'a> Carrier<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self {
            platform,
            chips: RefCell::new(Vec::new()),
            mux: RefCell::new(None),
            gpo: RefCell::new(None),
        }
    }

    pub fn platform(&self) -> &'a dyn Platform {
        self.platform
    }

    /// GPIO chip `index`, opened once
    pub fn chip(&self, index: u32) -> Result<Arc<dyn GpioChip>, LineError> {
        let mut chips = self.chips.borrow_mut();
        if let Some((_, chip)) = chips.iter().find(|(i, _)| *i == index) {
            return Ok(chip.clone());
        }
        let chip = self.platform.gpio_chip(index)?;
        chips.push((index, chip.clone()));
        Ok(chip)
    }

    /// The CARP line mux, opened and reset once
    pub fn mux(&self) -> Result<Arc<LineMux>, LineError> {
        if let Some(mux) = self.mux.borrow().as_ref() {
            return Ok(mux.clone());
        }
        let chip = self.chip(BASE_GPIO_CHIP)?;
        let mux = Arc::new(LineMux::open(chip.as_ref())?);
        *self.mux.borrow_mut() = Some(mux.clone());
        Ok(mux)
    }

    /// The transceiver GPO controller, switched to register mode once
    pub fn gpo(&self) -> Result<Arc<GpoController>, LineError> {
        if let Some(gpo) = self.gpo.borrow().as_ref() {
            return Ok(gpo.clone());
        }
        let device = self.platform.register_device(TRANSCEIVER_DEVICE)?;
        let gpo = Arc::new(GpoController::open(device)?);
        *self.gpo.borrow_mut() = Some(gpo.clone());
        Ok(gpo)
    }
}

impl fmt::Debug for Carrier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carrier")
            .field("mux_open", &self.mux.borrow().is_some())
            .field("gpo_open", &self.gpo.borrow().is_some())
            .finish_non_exhaustive()
    }
}

/// Pin resolution for one board
pub struct Wiring<'a> {
    carrier: &'a Carrier<'a>,
    card_chip: u32,
    carp: bool,
}

impl<'a> Wiring<'a> {
    /// Wiring for a card on GPIO chip `card_chip`, behind a CARP carrier
    /// if `carp` is set
    pub fn new(carrier: &'a Carrier<'a>, card_chip: u32, carp: bool) -> Self {
        Self {
            carrier,
            card_chip,
            carp,
        }
    }

    fn lines(&self, chip: u32, offsets: &[u32], consumer: &str) -> Result<LineHandle, LineError> {
        let chip = self.carrier.chip(chip)?;
        Ok(DirectLines::request(chip.as_ref(), offsets, consumer)?.into())
    }

    /// Lines on the base GPIO chip
    pub fn base(&self, offsets: &[u32], consumer: &str) -> Result<LineHandle, LineError> {
        self.lines(BASE_GPIO_CHIP, offsets, consumer)
    }

    /// Lines on the card's own GPIO chip
    pub fn card(&self, offsets: &[u32], consumer: &str) -> Result<LineHandle, LineError> {
        self.lines(self.card_chip, offsets, consumer)
    }

    /// Backpack lines: expander `positions` of `slot` behind a CARP
    /// carrier, otherwise `direct` offsets on the base chip
    pub fn backpack(
        &self,
        slot: u8,
        positions: &[u32],
        direct: &[u32],
        consumer: &str,
    ) -> Result<LineHandle, LineError> {
        if self.carp {
            let first = CARP_LINES_PER_SLOT * u32::from(slot);
            let offsets: Vec<u32> = positions.iter().map(|p| first + p).collect();
            self.lines(CARP_GPIO_CHIP, &offsets, consumer)
        } else {
            self.base(direct, consumer)
        }
    }

    /// Transceiver GPO pins: `carp` mux inputs behind a CARP carrier,
    /// otherwise `direct` GPO register bits
    pub fn transceiver_gpo(
        &self,
        carp: &[CarpInput],
        direct: &[AdGpo],
    ) -> Result<LineHandle, LineError> {
        if self.carp {
            let mux = self.carrier.mux()?;
            Ok(MuxLines::new(mux, carp).into())
        } else {
            let gpo = self.carrier.gpo()?;
            Ok(GpoLines::new(gpo, direct).into())
        }
    }

    /// TX enable pin of the card in `slot` (transceiver GPO 2)
    pub fn tx_enable(&self, board: &'static str, slot: u8) -> Result<LineHandle, BoardError> {
        if self.carp {
            let pin =
                CarpInput::tx_enable(slot).ok_or(BoardError::UnsupportedSlot { board, slot })?;
            Ok(self.transceiver_gpo(&[pin], &[])?)
        } else {
            Ok(self.transceiver_gpo(&[], &[AdGpo::Gpo2])?)
        }
    }

    /// Auxiliary enable pins of the card in `slot` (transceiver GPO 0 and 1)
    pub fn aux_enables(&self, board: &'static str, slot: u8) -> Result<LineHandle, BoardError> {
        if self.carp {
            let pins =
                CarpInput::aux_enables(slot).ok_or(BoardError::UnsupportedSlot { board, slot })?;
            Ok(self.transceiver_gpo(&pins, &[])?)
        } else {
            Ok(self.transceiver_gpo(&[], &[AdGpo::Gpo0, AdGpo::Gpo1])?)
        }
    }

    /// Transceiver RX/TX path lines, labelled `<prefix>_RX_CTRL` and
    /// `<prefix>_TX_CTRL`
    pub fn rx_tx(&self, transceiver: u8, prefix: &str) -> Result<RxTxLines, LineError> {
        let (rx, tx) = if self.carp {
            let shift = CARP_CTRL_STRIDE * u32::from(transceiver);
            (CARP_RX_CTRL_BASE + shift, CARP_TX_CTRL_BASE + shift)
        } else {
            (RX_CTRL_LINE, TX_CTRL_LINE)
        };
        debug!("RX/TX control on lines {} and {}", rx, tx);

        let rx = self.base(&[rx], &format!("{}_RX_CTRL", prefix))?;
        let tx = self.base(&[tx], &format!("{}_TX_CTRL", prefix))?;
        Ok(RxTxLines::new(rx, tx))
    }
}
