//! Bismuth amplifier card
//!
//! Bismuth carries a two-stage PA with a selectable power level, two LNAs
//! enabled through transceiver GPO 0 and 1, a 0-18 dB RX step attenuator
//! and a TX harmonic filter bank. Behind a CARP carrier only slots 1 and 2
//! have both LNA enables routed, so those are the only usable slots.

use std::sync::Arc;

use pc_gpio::platform::Platform;
use pc_gpio::{LineHandle, HIGH, LOW};

use crate::bank::{LineBank, RxTxLines};
use crate::config::BismuthConfig;
use crate::diagnostics::{Diagnostics, Reporter};
use crate::error::BoardError;
use crate::filters::{TX_FILTERS, TX_UNFILTERED_HZ};
use crate::wiring::{Carrier, Wiring};

const BOARD: &str = "bismuth";

/// PA stage levels, lowest power first
pub const PA_LEVELS: [[u8; 2]; 3] = [[0, 0], [1, 0], [1, 1]];

/// RX attenuator levels, indexed by step
pub const RX_ATT_LEVELS: [[u8; 2]; 4] = [[0, 0], [0, 1], [1, 0], [1, 1]];

/// RX attenuation of each step in dB
pub const RX_ATT_DB: [u8; 4] = [0, 6, 12, 18];

/// Bismuth card controller
#[derive(Debug)]
pub struct Bismuth {
    reporter: Reporter,
    tx_enable: LineHandle,
    lna_enable: LineHandle,
    rx_tx: Option<RxTxLines>,
    pa: LineBank,
    tx_filters: LineBank,
    rx_att: LineBank,
    pa_enable: LineHandle,
}

impl Bismuth {
    /// Acquire every line, then reset if configured
    pub fn open(
        platform: &dyn Platform,
        config: &BismuthConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Like [`Bismuth::open`], sharing `carrier` with other boards
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &BismuthConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        let reporter = Reporter::new(format!("{}_{}", BOARD, config.slot), diagnostics);
        reporter.debug(format!(
            "Initializing on gpiochip{} slot {} (CARP {})",
            config.gpiochip, config.slot, config.carp
        ));

        let wiring = Wiring::new(carrier, config.gpiochip, config.carp);

        let lna_enable = wiring.aux_enables(BOARD, config.slot)?;
        let tx_enable = wiring.tx_enable(BOARD, config.slot)?;
        let rx_tx = if config.control_rxtx {
            Some(wiring.rx_tx(config.transceiver, "BISMUTH")?)
        } else {
            None
        };
        let pa = LineBank::single(
            "pa",
            wiring.backpack(config.slot, &[1, 2], &[94, 95], "BISMUTH_PA")?,
        );
        let tx_filters = LineBank::single(
            "tx_filters",
            wiring.backpack(config.slot, &[3, 4, 5], &[96, 97, 98], "BISMUTH_TX_FILT")?,
        );
        let rx_att = LineBank::single("rx_att", wiring.card(&[5, 6], "BISMUTH_RX_ATT")?);
        let pa_enable = wiring.card(&[7], "BISMUTH_PA_ENABLE")?;

        let mut bismuth = Self {
            reporter,
            tx_enable,
            lna_enable,
            rx_tx,
            pa,
            tx_filters,
            rx_att,
            pa_enable,
        };
        if config.reset {
            bismuth.reset()?;
        }
        Ok(bismuth)
    }

    /// Instance name, e.g. `bismuth_1`
    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn pa(&self) -> &LineBank {
        &self.pa
    }

    pub fn rx_att(&self) -> &LineBank {
        &self.rx_att
    }

    pub fn tx_filters(&self) -> &LineBank {
        &self.tx_filters
    }

    /// TX unfiltered, lowest PA level, no attenuation, PA and LNAs off,
    /// receiving
    pub fn reset(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Resetting");
        self.configure_tx_unfiltered()?;
        self.configure_pa(0)?;
        self.configure_rx_att(0)?;
        self.disable_pa()?;
        self.disable_lnas()
    }

    /// Set the PA power level (0-2)
    ///
    /// Out-of-range levels are reported and leave the hardware untouched.
    pub fn configure_pa(&mut self, level: u8) -> Result<(), BoardError> {
        let Some(levels) = PA_LEVELS.get(usize::from(level)) else {
            self.reporter.warn("Power level must be 0-2");
            return Ok(());
        };
        self.pa.drive(levels)?;
        self.reporter.info(format!("Power level set to {}", level));
        Ok(())
    }

    /// Set the RX attenuator step (0-3, 6 dB each)
    ///
    /// Out-of-range steps are reported and leave the hardware untouched.
    pub fn configure_rx_att(&mut self, level: u8) -> Result<(), BoardError> {
        let index = usize::from(level);
        let Some(levels) = RX_ATT_LEVELS.get(index) else {
            self.reporter.warn("Attenuation level must be 0-3");
            return Ok(());
        };
        self.rx_att.drive(levels)?;
        self.reporter
            .info(format!("RX attenuation set to {}dB", RX_ATT_DB[index]));
        Ok(())
    }

    pub fn enable_lnas(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Enabling LNAs");
        self.lna_enable.set(&[HIGH, HIGH])?;
        Ok(())
    }

    pub fn disable_lnas(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Disabling LNAs");
        self.lna_enable.set(&[LOW, LOW])?;
        Ok(())
    }

    /// Switch to transmit with the PA on and the LNAs off
    pub fn enable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Enabling PAs");
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(false)?;
            rx_tx.set_tx(true)?;
        }
        self.disable_lnas()?;
        self.pa_enable.set(&[HIGH])?;
        self.tx_enable.set(&[HIGH])?;
        Ok(())
    }

    /// Switch to receive with the PA off and the LNAs on
    pub fn disable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Disabling PAs");
        self.tx_enable.set(&[LOW])?;
        self.pa_enable.set(&[LOW])?;
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(true)?;
            rx_tx.set_tx(false)?;
        }
        self.enable_lnas()
    }

    pub fn configure_transmit(&mut self) -> Result<(), BoardError> {
        self.enable_pa()
    }

    pub fn configure_receive(&mut self) -> Result<(), BoardError> {
        self.disable_pa()
    }

    /// Select the TX filter for `hz`
    pub fn configure_tx_filters(&mut self, hz: u64) -> Result<(), BoardError> {
        let selection = TX_FILTERS.select("TX", hz)?;
        self.reporter
            .info(format!("Configuring TX filters for {}", selection.label));
        self.tx_filters.drive(selection.levels)?;
        Ok(())
    }

    pub fn configure_tx_unfiltered(&mut self) -> Result<(), BoardError> {
        self.configure_tx_filters(TX_UNFILTERED_HZ)
    }
}
