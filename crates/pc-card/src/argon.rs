//! Argon synthesizer card
//!
//! Argon extends a transceiver above 6 GHz with an external synthesizer and
//! RX/TX mixers, plus a TX harmonic filter bank on its backpack. TX filter
//! selection works on the transceiver-side frequency: while the synthesizer
//! is locked the band centre is subtracted first.

use std::sync::Arc;

use pc_gpio::platform::Platform;
use pc_gpio::{LineHandle, HIGH, LOW};

use crate::bank::{LineBank, RxTxLines};
use crate::config::ArgonConfig;
use crate::diagnostics::{Diagnostics, Reporter};
use crate::error::BoardError;
use crate::filters::{TX_FILTERS, TX_UNFILTERED_HZ};
use crate::synth::{SynthLines, SynthState, Synthesizer, SYNTH_MIN_HZ};
use crate::wiring::{Carrier, Wiring};

const BOARD: &str = "argon";

/// Argon card controller
#[derive(Debug)]
pub struct Argon {
    reporter: Reporter,
    tx_enable: LineHandle,
    rx_tx: Option<RxTxLines>,
    tx_filters: LineBank,
    synth: Synthesizer,
}

impl Argon {
    /// Acquire every line and the synthesizer bus, then reset if configured
    pub fn open(
        platform: &dyn Platform,
        config: &ArgonConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Like [`Argon::open`], sharing `carrier` with other boards
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &ArgonConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        let reporter = Reporter::new(format!("{}_{}", BOARD, config.slot), diagnostics);
        reporter.debug(format!(
            "Initializing on gpiochip{} slot {} (CARP {}), bridge 0x{:02X} on i2c-{}",
            config.gpiochip, config.slot, config.carp, config.address, config.i2c_bus
        ));

        let wiring = Wiring::new(carrier, config.gpiochip, config.carp);

        let bus = carrier.platform().block_bus(config.i2c_bus)?;
        let tx_enable = wiring.tx_enable(BOARD, config.slot)?;
        let rx_tx = if config.control_rxtx {
            Some(wiring.rx_tx(config.transceiver, "ARGON")?)
        } else {
            None
        };
        let tx_filters = LineBank::single(
            "tx_filters",
            wiring.backpack(config.slot, &[1, 2, 3], &[95, 96, 97], "ARGON_TX_FILT")?,
        );
        let lines = SynthLines {
            enable: wiring.card(&[0], "ARGON_SYNTH_EN")?,
            rx_mixer: wiring.card(&[1], "ARGON_RX_MIX_EN")?,
            tx_mixer: wiring.card(&[2], "ARGON_TX_MIX_EN")?,
        };

        let delay = carrier.platform().delay();
        let mut synth = Synthesizer::new(bus, config.address, delay, lines, reporter.clone());
        synth.configure_bridge()?;

        let mut argon = Self {
            reporter,
            tx_enable,
            rx_tx,
            tx_filters,
            synth,
        };
        if config.reset {
            argon.reset()?;
        }
        Ok(argon)
    }

    /// Instance name, e.g. `argon_0`
    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn synth_state(&self) -> SynthState {
        self.synth.state()
    }

    pub fn tx_filters(&self) -> &LineBank {
        &self.tx_filters
    }

    /// Synthesizer down, TX unfiltered, receiving
    pub fn reset(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Resetting");
        self.reset_synth()?;
        self.configure_tx_unfiltered()?;
        self.configure_receive()
    }

    pub fn reset_synth(&mut self) -> Result<(), BoardError> {
        Ok(self.synth.reset()?)
    }

    /// Send raw bytes to the synthesizer over the SPI bridge
    pub fn send_spi(&mut self, data: &[u8]) -> Result<(), BoardError> {
        Ok(self.synth.send(data)?)
    }

    /// Select the TX filter for RF frequency `hz`
    pub fn configure_tx_filters(&mut self, hz: u64) -> Result<(), BoardError> {
        let offset = self.synth.state().offset(hz);
        let selection = TX_FILTERS.select("TX", offset)?;
        self.reporter
            .info(format!("Configuring TX filters for {}", selection.label));
        self.tx_filters.drive(selection.levels)?;
        Ok(())
    }

    pub fn configure_tx_unfiltered(&mut self) -> Result<(), BoardError> {
        let offset = self.synth.state().center_hz().unwrap_or(0);
        self.configure_tx_filters(TX_UNFILTERED_HZ + offset)
    }

    /// Tune the synthesizer for RF frequency `hz`
    ///
    /// Returns the frequency the transceiver should tune to. With
    /// `autofilter` the TX filters follow: unfiltered if `hz` is beyond the
    /// synthesizer, otherwise the filter for the tuned frequency.
    pub fn configure_synth(&mut self, hz: u64, autofilter: bool) -> Result<u64, BoardError> {
        let tuned = self.synth.configure(hz)?;
        if autofilter {
            match self.synth.state() {
                SynthState::Down if hz >= SYNTH_MIN_HZ => self.configure_tx_unfiltered()?,
                _ => self.configure_tx_filters(hz)?,
            }
        }
        Ok(tuned)
    }

    pub fn configure_transmit(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Configuring for transmit");
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(false)?;
            rx_tx.set_tx(true)?;
        }
        self.tx_enable.set(&[HIGH])?;
        Ok(())
    }

    pub fn configure_receive(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Configuring for receive");
        self.tx_enable.set(&[LOW])?;
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_tx(false)?;
            rx_tx.set_rx(true)?;
        }
        Ok(())
    }
}
